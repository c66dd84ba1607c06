use super::{ClassUniverseProvider, ProviderError, ProviderOutput};
use crate::core::ClassDescriptor;
use tracing::debug;

/// Restricts another provider to the concrete types of one package.
///
/// Sub-packages are included. An empty package name keeps every package,
/// so only the concreteness filter applies.
pub struct NamespaceProvider<P> {
    inner: P,
    package: String,
}

impl<P: ClassUniverseProvider> NamespaceProvider<P> {
    pub fn new(inner: P, package: impl Into<String>) -> Self {
        Self {
            inner,
            package: package.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    fn admits(&self, class: &ClassDescriptor) -> bool {
        class.is_concrete() && in_package(class.package(), &self.package)
    }
}

fn in_package(class_package: &str, package: &str) -> bool {
    package.is_empty()
        || class_package == package
        || class_package
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
}

impl<P: ClassUniverseProvider> ClassUniverseProvider for NamespaceProvider<P> {
    fn provide(&self) -> Result<ProviderOutput, ProviderError> {
        let mut output = self.inner.provide()?;
        let before = output.classes.len();
        output.classes.retain(|class| self.admits(class));

        debug!(
            package = %self.package,
            kept = output.classes.len(),
            filtered = before - output.classes.len(),
            "Namespace filter applied"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<ClassDescriptor>);

    impl ClassUniverseProvider for Fixed {
        fn provide(&self) -> Result<ProviderOutput, ProviderError> {
            Ok(ProviderOutput {
                classes: self.0.clone(),
                warnings: Vec::new(),
            })
        }
    }

    fn abstract_class(name: &str) -> ClassDescriptor {
        let mut class = ClassDescriptor::new(name);
        class.is_abstract = true;
        class
    }

    fn interface(name: &str) -> ClassDescriptor {
        let mut class = ClassDescriptor::new(name);
        class.is_interface = true;
        class
    }

    fn names(output: &ProviderOutput) -> Vec<&str> {
        output.classes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_keeps_concrete_types_of_package_and_subpackages() {
        let provider = NamespaceProvider::new(
            Fixed(vec![
                ClassDescriptor::new("com.acme.Widget"),
                ClassDescriptor::new("com.acme.io.Reader"),
                ClassDescriptor::new("com.acmetools.Hammer"),
                ClassDescriptor::new("org.other.Thing"),
                abstract_class("com.acme.Shape"),
                interface("com.acme.Drawable"),
            ]),
            "com.acme",
        );

        let output = provider.provide().unwrap();
        assert_eq!(names(&output), vec!["com.acme.Widget", "com.acme.io.Reader"]);
    }

    #[test]
    fn test_empty_package_keeps_all_concrete_types() {
        let provider = NamespaceProvider::new(
            Fixed(vec![
                ClassDescriptor::new("Top"),
                ClassDescriptor::new("a.B"),
                interface("a.I"),
            ]),
            "",
        );

        let output = provider.provide().unwrap();
        assert_eq!(names(&output), vec!["Top", "a.B"]);
    }
}

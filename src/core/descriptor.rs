//! Static descriptor model for classes, methods and fields.
//!
//! Descriptors are populated once by a
//! [`ClassUniverseProvider`](crate::provider::ClassUniverseProvider) and never
//! mutated by the calculators. Owning classes and superclasses are
//! referenced by qualified name rather than by pointer, so descriptors can be
//! moved freely into a [`Universe`](crate::core::Universe).

use serde::{Deserialize, Serialize};

/// Member visibility as declared in the compiled class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    /// No access modifier (visible within the declaring package only)
    Package,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }

    /// Whether a member with this visibility is inherited by a subclass.
    ///
    /// Package-private members only cross into subclasses of the same package.
    pub fn is_inheritable(self, same_package: bool) -> bool {
        match self {
            Visibility::Public | Visibility::Protected => true,
            Visibility::Package => same_package,
            Visibility::Private => false,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
            Self::Package => write!(f, "package"),
        }
    }
}

/// Structural method identity: name plus ordered parameter types.
///
/// Two methods from different classes with equal signatures are distinct
/// methods; the signature only decides whether one overrides or shadows the
/// other along an inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature<'a> {
    pub name: &'a str,
    pub parameter_types: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_abstract: bool,
    /// Qualified name of the declaring class
    #[serde(default)]
    pub owner: String,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            parameter_types: Vec::new(),
            visibility,
            is_abstract: false,
            owner: String::new(),
        }
    }

    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn signature(&self) -> Signature<'_> {
        Signature {
            name: &self.name,
            parameter_types: &self.parameter_types,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    /// Qualified name of the declaring class
    #[serde(default)]
    pub owner: String,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility,
            owner: String::new(),
        }
    }
}

/// A class (or interface, or enum) as seen by the metrics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Set by providers that failed to resolve `superclass` and want the
    /// boundary reported as a missing descriptor instead of silently accepted.
    #[serde(default)]
    pub superclass_unresolved: bool,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            superclass_unresolved: false,
            interfaces: Vec::new(),
            is_abstract: false,
            is_interface: false,
            is_enum: false,
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add a method, stamping this class as its owner.
    pub fn with_method(mut self, mut method: MethodDescriptor) -> Self {
        method.owner = self.name.clone();
        self.methods.push(method);
        self
    }

    /// Add a field, stamping this class as its owner.
    pub fn with_field(mut self, mut field: FieldDescriptor) -> Self {
        field.owner = self.name.clone();
        self.fields.push(field);
        self
    }

    /// Package part of the qualified name (empty for the default package).
    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    /// Concrete types are neither interfaces, abstract classes nor enums.
    pub fn is_concrete(&self) -> bool {
        !self.is_interface && !self.is_abstract && !self.is_enum
    }

    /// Fill in missing `owner` fields on members.
    ///
    /// Manifest-loaded descriptors may omit owners; the engine relies on them
    /// when reporting which class a member came from.
    pub fn normalize_owners(&mut self) {
        for method in self.methods.iter_mut().filter(|m| m.owner.is_empty()) {
            method.owner = self.name.clone();
        }
        for field in self.fields.iter_mut().filter(|f| f.owner.is_empty()) {
            field.owner = self.name.clone();
        }
    }
}

pub fn package_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_of_nested_and_default() {
        assert_eq!(package_of("org.example.Main"), "org.example");
        assert_eq!(package_of("Main"), "");
    }

    #[test]
    fn test_with_method_sets_owner() {
        let class =
            ClassDescriptor::new("a.A").with_method(MethodDescriptor::new("m", Visibility::Public));
        assert_eq!(class.methods[0].owner, "a.A");
    }

    #[test]
    fn test_signature_ignores_visibility_and_owner() {
        let a = MethodDescriptor::new("run", Visibility::Public).with_parameters(["int"]);
        let mut b = MethodDescriptor::new("run", Visibility::Private).with_parameters(["int"]);
        b.owner = "other.B".into();
        assert_eq!(a.signature(), b.signature());

        let c = MethodDescriptor::new("run", Visibility::Public).with_parameters(["long"]);
        assert_ne!(a.signature(), c.signature());
    }

    #[test]
    fn test_is_concrete() {
        let mut class = ClassDescriptor::new("a.A");
        assert!(class.is_concrete());
        class.is_enum = true;
        assert!(!class.is_concrete());
    }

    #[test]
    fn test_package_visibility_inheritance() {
        assert!(Visibility::Package.is_inheritable(true));
        assert!(!Visibility::Package.is_inheritable(false));
        assert!(!Visibility::Private.is_inheritable(true));
        assert!(Visibility::Protected.is_inheritable(false));
    }

    #[test]
    fn test_normalize_owners_fills_only_missing() {
        let mut class = ClassDescriptor::new("a.A");
        class.methods.push(MethodDescriptor::new("m", Visibility::Public));
        let mut field = FieldDescriptor::new("f", "int", Visibility::Private);
        field.owner = "b.B".into();
        class.fields.push(field);

        class.normalize_owners();

        assert_eq!(class.methods[0].owner, "a.A");
        assert_eq!(class.fields[0].owner, "b.B");
    }
}

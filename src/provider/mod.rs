//! Universe providers: where class descriptors come from.
//!
//! A [`ClassUniverseProvider`] yields the descriptors of one analysis run plus
//! any non-fatal [`ProviderWarning`]s (entries that could not be resolved).
//! Failing to produce a universe at all is a [`ProviderError`].
//!
//! - [`ArchiveProvider`]: `.class` entries of a jar/zip archive
//! - [`DirectoryProvider`]: `.class` files under a classpath directory
//! - [`ManifestProvider`]: descriptors serialized as JSON
//! - [`NamespaceProvider`]: concrete types of one package, from any provider

pub mod archive;
pub mod classfile;
pub mod directory;
pub mod manifest;
pub mod namespace;

use crate::core::{ClassDescriptor, Universe};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use archive::ArchiveProvider;
pub use classfile::{parse_class_file, ClassFileError};
pub use directory::DirectoryProvider;
pub use manifest::ManifestProvider;
pub use namespace::NamespaceProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A class entry that was skipped while building the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderWarning {
    /// Archive entry or file path the class came from
    pub entry: String,
    pub message: String,
}

impl std::fmt::Display for ProviderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.entry, self.message)
    }
}

/// Descriptors plus the warnings collected while producing them.
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    pub classes: Vec<ClassDescriptor>,
    pub warnings: Vec<ProviderWarning>,
}

impl ProviderOutput {
    pub fn warn(&mut self, entry: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ProviderWarning {
            entry: entry.into(),
            message: message.into(),
        });
    }

    pub fn into_universe(self) -> (Universe, Vec<ProviderWarning>) {
        (self.classes.into_iter().collect(), self.warnings)
    }
}

pub trait ClassUniverseProvider {
    fn provide(&self) -> Result<ProviderOutput, ProviderError>;
}

impl<P: ClassUniverseProvider + ?Sized> ClassUniverseProvider for Box<P> {
    fn provide(&self) -> Result<ProviderOutput, ProviderError> {
        (**self).provide()
    }
}

/// Turns the bytes found under a qualified name into a descriptor.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, qualified_name: &str, bytes: &[u8]) -> Result<ClassDescriptor, String>;
}

/// Resolver for compiled JVM class files.
///
/// Rejects files whose declared class name differs from the name derived
/// from their location, which is what a class loader would do.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileResolver;

impl TypeResolver for ClassFileResolver {
    fn resolve(&self, qualified_name: &str, bytes: &[u8]) -> Result<ClassDescriptor, String> {
        let class = parse_class_file(bytes).map_err(|e| e.to_string())?;
        if class.name != qualified_name {
            return Err(format!("file declares class {}", class.name));
        }
        Ok(class)
    }
}

/// Where the descriptors of a run come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Guess from the input path
    #[default]
    Auto,
    /// Jar or zip archive
    Archive,
    /// Directory of `.class` files
    Classpath,
    /// JSON descriptor manifest
    Manifest,
}

impl SourceKind {
    /// Resolve `Auto`: directories are classpaths, `.json` files manifests,
    /// anything else an archive.
    pub fn detect(self, path: &Path) -> SourceKind {
        match self {
            SourceKind::Auto if path.is_dir() => SourceKind::Classpath,
            SourceKind::Auto
                if path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json")) =>
            {
                SourceKind::Manifest
            }
            SourceKind::Auto => SourceKind::Archive,
            explicit => explicit,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Auto => "auto",
            SourceKind::Archive => "archive",
            SourceKind::Classpath => "classpath",
            SourceKind::Manifest => "manifest",
        };
        f.write_str(name)
    }
}

/// Build the provider for `path`, optionally narrowed to one package.
pub fn open_provider(
    path: &Path,
    kind: SourceKind,
    package: Option<&str>,
) -> Box<dyn ClassUniverseProvider> {
    let base: Box<dyn ClassUniverseProvider> = match kind.detect(path) {
        SourceKind::Classpath => Box::new(DirectoryProvider::new(path)),
        SourceKind::Manifest => Box::new(ManifestProvider::new(path)),
        SourceKind::Archive | SourceKind::Auto => Box::new(ArchiveProvider::new(path)),
    };
    match package {
        Some(package) => Box::new(NamespaceProvider::new(base, package)),
        None => base,
    }
}

/// Map an archive entry path to a qualified class name.
///
/// Returns `None` for directories, entries ending in `!`, and anything that
/// is not a `.class` file.
pub fn entry_to_class_name(entry: &str) -> Option<String> {
    if entry.ends_with('/') || entry.ends_with('!') {
        return None;
    }
    entry
        .strip_suffix(".class")
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.replace(['/', '\\'], "."))
}

/// Resolve one entry, recording a warning instead of failing.
pub(crate) fn resolve_entry(
    resolver: &dyn TypeResolver,
    output: &mut ProviderOutput,
    entry: &str,
    qualified_name: &str,
    bytes: &[u8],
) {
    match resolver.resolve(qualified_name, bytes) {
        Ok(class) => output.classes.push(class),
        Err(message) => {
            tracing::warn!(entry, %message, "Could not resolve class");
            output.warn(entry, format!("could not resolve {qualified_name}: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ClassFileBuilder;

    #[test]
    fn test_entry_to_class_name() {
        assert_eq!(
            entry_to_class_name("org/example/Main.class").as_deref(),
            Some("org.example.Main")
        );
        assert_eq!(
            entry_to_class_name("org/example/Outer$Inner.class").as_deref(),
            Some("org.example.Outer$Inner")
        );
        assert_eq!(entry_to_class_name("org/example/"), None);
        assert_eq!(entry_to_class_name("META-INF/MANIFEST.MF"), None);
        assert_eq!(entry_to_class_name("weird.class!"), None);
        assert_eq!(entry_to_class_name(".class"), None);
    }

    #[test]
    fn test_source_kind_detection() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(SourceKind::Auto.detect(dir.path()), SourceKind::Classpath);
        assert_eq!(
            SourceKind::Auto.detect(Path::new("classes.JSON")),
            SourceKind::Manifest
        );
        assert_eq!(SourceKind::Auto.detect(Path::new("lib.jar")), SourceKind::Archive);
        assert_eq!(
            SourceKind::Archive.detect(Path::new("classes.json")),
            SourceKind::Archive
        );
    }

    #[test]
    fn test_open_provider_applies_package_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(
            &path,
            r#"[{ "name": "a.Kept" }, { "name": "b.Dropped" }, { "name": "a.sub.Kept" }]"#,
        )
        .unwrap();

        let output = open_provider(&path, SourceKind::Auto, Some("a")).provide().unwrap();
        let names: Vec<_> = output.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.Kept", "a.sub.Kept"]);

        let output = open_provider(&path, SourceKind::Auto, None).provide().unwrap();
        assert_eq!(output.classes.len(), 3);
    }

    #[test]
    fn test_class_file_resolver_checks_name() {
        let bytes = ClassFileBuilder::new("a/Real").build();

        assert!(ClassFileResolver.resolve("a.Real", &bytes).is_ok());
        let err = ClassFileResolver.resolve("a.Other", &bytes).unwrap_err();
        assert_eq!(err, "file declares class a.Real");
    }

    #[test]
    fn test_resolve_entry_collects_warning() {
        let mut output = ProviderOutput::default();
        resolve_entry(&ClassFileResolver, &mut output, "a/Bad.class", "a.Bad", b"nope");

        assert!(output.classes.is_empty());
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].entry, "a/Bad.class");
    }
}

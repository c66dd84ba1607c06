use super::{
    entry_to_class_name, resolve_entry, ClassFileResolver, ClassUniverseProvider, ProviderError,
    ProviderOutput, TypeResolver,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};
use walkdir::WalkDir;

/// Reads `.class` files under a classpath root directory.
///
/// Paths relative to the root give the qualified names, exactly like entry
/// paths inside an archive.
pub struct DirectoryProvider {
    root: PathBuf,
    resolver: Box<dyn TypeResolver>,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_resolver(root, ClassFileResolver)
    }

    pub fn with_resolver(root: impl Into<PathBuf>, resolver: impl TypeResolver + 'static) -> Self {
        Self {
            root: root.into(),
            resolver: Box::new(resolver),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassUniverseProvider for DirectoryProvider {
    fn provide(&self) -> Result<ProviderOutput, ProviderError> {
        let _span = info_span!("classpath_scan", root = %self.root.display()).entered();

        std::fs::metadata(&self.root).map_err(|source| ProviderError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut output = ProviderOutput::default();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    output.warn(path, e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let entry_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let Some(qualified_name) = entry_to_class_name(&entry_name) else {
                continue;
            };

            match std::fs::read(entry.path()) {
                Ok(bytes) => resolve_entry(
                    self.resolver.as_ref(),
                    &mut output,
                    &entry_name,
                    &qualified_name,
                    &bytes,
                ),
                Err(e) => output.warn(entry_name, format!("unreadable file: {e}")),
            }
        }

        debug!(
            classes = output.classes.len(),
            warnings = output.warnings.len(),
            "Classpath directory scanned"
        );
        Ok(output)
    }
}

use super::{
    entry_to_class_name, resolve_entry, ClassFileResolver, ClassUniverseProvider, ProviderError,
    ProviderOutput, TypeResolver,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};

const MAX_PREALLOCATION: u64 = 1 << 20;

/// Buffer size for an entry. Header sizes are untrusted and only seed the
/// buffer up to a cap.
fn preallocation_hint(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

/// Reads every `.class` entry of a jar (zip) archive.
pub struct ArchiveProvider {
    path: PathBuf,
    resolver: Box<dyn TypeResolver>,
}

impl ArchiveProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_resolver(path, ClassFileResolver)
    }

    pub fn with_resolver(path: impl Into<PathBuf>, resolver: impl TypeResolver + 'static) -> Self {
        Self {
            path: path.into(),
            resolver: Box::new(resolver),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassUniverseProvider for ArchiveProvider {
    fn provide(&self) -> Result<ProviderOutput, ProviderError> {
        let _span = info_span!("archive_scan", path = %self.path.display()).entered();

        let file = File::open(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|source| ProviderError::Archive {
                path: self.path.clone(),
                source,
            })?;

        let mut output = ProviderOutput::default();
        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    output.warn(format!("entry #{index}"), e.to_string());
                    continue;
                }
            };
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let Some(qualified_name) = entry_to_class_name(&name) else {
                continue;
            };

            let mut bytes = Vec::with_capacity(preallocation_hint(entry.size()));
            if let Err(e) = entry.read_to_end(&mut bytes) {
                output.warn(&name, format!("unreadable entry: {e}"));
                continue;
            }
            resolve_entry(
                self.resolver.as_ref(),
                &mut output,
                &name,
                &qualified_name,
                &bytes,
            );
        }

        debug!(
            classes = output.classes.len(),
            warnings = output.warnings.len(),
            "Archive scanned"
        );
        Ok(output)
    }
}

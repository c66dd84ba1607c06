use super::{ClassUniverseProvider, ProviderError, ProviderOutput};
use crate::core::ClassDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};

/// Reads class descriptors from a JSON manifest.
///
/// The manifest is either a bare array of descriptors or an object with a
/// `classes` array. Descriptors are taken as-is, no resolution happens.
#[derive(Debug, Clone)]
pub struct ManifestProvider {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    Bare(Vec<ClassDescriptor>),
    Wrapped { classes: Vec<ClassDescriptor> },
}

impl ManifestProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse manifest text into descriptors.
pub fn parse_manifest(content: &str) -> Result<Vec<ClassDescriptor>, serde_json::Error> {
    let manifest: Manifest = serde_json::from_str(content)?;
    Ok(match manifest {
        Manifest::Bare(classes) | Manifest::Wrapped { classes } => classes,
    })
}

impl ClassUniverseProvider for ManifestProvider {
    fn provide(&self) -> Result<ProviderOutput, ProviderError> {
        let _span = info_span!("manifest_load", path = %self.path.display()).entered();

        let content = std::fs::read_to_string(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        let classes = parse_manifest(&content).map_err(|source| ProviderError::Manifest {
            path: self.path.clone(),
            source,
        })?;

        debug!(classes = classes.len(), "Manifest loaded");
        Ok(ProviderOutput {
            classes,
            warnings: Vec::new(),
        })
    }
}

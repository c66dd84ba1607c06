//! Shared error types for the metrics engine

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oometrics operations
#[derive(Debug, Error)]
pub enum Error {
    /// Following the superclass chain revisited a class already on the path
    #[error("Cyclic inheritance involving {class}: {}", cycle.join(" -> "))]
    CyclicHierarchy { class: String, cycle: Vec<String> },

    /// A superclass the provider marked as unresolved is not in the universe
    #[error("Missing descriptor for superclass {superclass} of {class}")]
    MissingDescriptor { class: String, superclass: String },

    /// A class name was looked up that is not part of the universe
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Aggregates are undefined over a universe with no evaluated classes
    #[error("Cannot aggregate metrics over an empty universe")]
    EmptyUniverse,

    /// Universe provider failures (fatal at startup)
    #[error(transparent)]
    Provider(#[from] crate::provider::ProviderError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },
}

impl Error {
    /// Create a configuration error tied to a config file
    pub fn configuration(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Configuration {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Whether the error only affects part of the analysis.
    ///
    /// Recoverable errors are reported next to the results instead of
    /// aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CyclicHierarchy { .. } | Self::MissingDescriptor { .. }
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

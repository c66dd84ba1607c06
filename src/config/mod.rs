//! `.oometrics.toml` configuration.
//!
//! Every section is optional; missing values fall back to the defaults of
//! the analysis, and command-line flags override whatever the file says.

mod core;
mod loader;

pub use self::core::{AnalysisConfig, OoMetricsConfig, OutputConfig, ParallelConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config, CONFIG_FILE_NAME,
};

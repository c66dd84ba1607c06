//! CLI command implementations.
//!
//! - **analyze**: compute per-class and overall metrics for a class universe
//! - **init**: write a default `.oometrics.toml`

pub mod analyze;
pub mod init;

pub use analyze::{handle_analyze, load_file_config, run_analysis, AnalyzeArgs, AnalyzeConfig};
pub use init::init_config;

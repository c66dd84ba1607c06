use crate::io::output::OutputFormat;
use crate::metrics::HidingScope;
use crate::provider::SourceKind;
use serde::{Deserialize, Serialize};

/// Root configuration structure for oometrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OoMetricsConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Implicit root of every hierarchy; its members never count as inherited
    #[serde(default)]
    pub root_type: Option<String>,

    #[serde(default)]
    pub scope: Option<HidingScope>,

    /// Restrict the run to the concrete types of this package
    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub source: Option<SourceKind>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Evaluate classes on the rayon pool (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker threads; all cores when unset
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            jobs: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: Option<OutputFormat>,
    /// Enable colored output (default: auto-detect based on TTY)
    #[serde(default)]
    pub use_color: Option<bool>,
}

impl OoMetricsConfig {
    /// Text written by `oometrics init`.
    pub fn default_toml() -> &'static str {
        r#"# oometrics configuration

[analysis]
root_type = "java.lang.Object"
scope = "per-class"
# package = "com.example"
source = "auto"

[parallel]
enabled = true
# jobs = 4

[output]
default_format = "terminal"
"#
    }
}

//! Object-oriented design metrics over an inheritance graph.
//!
//! - [`hiding`]: MHF, AHF, MIF, AIF
//! - [`polymorphism`]: override detection and POF
//! - [`aggregate`]: the single pass producing per-class and universe records

pub mod aggregate;
pub mod hiding;
pub mod polymorphism;

use serde::{Deserialize, Serialize};

pub use aggregate::{
    analyze_universe, evaluate_class, AggregateMetrics, AnalysisOptions, ClassMetrics,
    ClassOutcome, MetricsReport, Totals,
};
pub use hiding::{
    calculate_hiding_factors, universe_hiding_factors, HidingFactors, MemberCounts, MemberView,
};
pub use polymorphism::{calculate_pof, count_overridden_methods, OverrideCounts};

/// Qualified name of the implicit superclass whose members never count as
/// inherited.
pub const DEFAULT_ROOT_TYPE: &str = "java.lang.Object";

/// Which member counts the per-class hiding/inheritance columns divide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HidingScope {
    /// Each class's own declared and visible members
    #[default]
    PerClass,
    /// Member counts summed over the whole universe, repeated on every class
    Universe,
}

impl std::fmt::Display for HidingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerClass => write!(f, "per-class"),
            Self::Universe => write!(f, "universe"),
        }
    }
}

/// Divide two counts, treating a zero denominator as a zero ratio.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

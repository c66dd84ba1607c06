//! Aggregation engine: one pass over the universe.
//!
//! Each class is evaluated independently against the shared, read-only
//! [`InheritanceGraph`]; the counts behind the universe formulas are summed
//! in the same traversal with an associative, commutative [`Totals::merge`],
//! so the pass can run on rayon's pool without changing the result.

use super::hiding::{HidingFactors, MemberCounts, MemberView};
use super::polymorphism::OverrideCounts;
use super::{ratio, HidingScope, DEFAULT_ROOT_TYPE};
use crate::core::{ClassDescriptor, Error, Result, Universe};
use crate::graph::InheritanceGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info_span, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub scope: HidingScope,
    /// Members of this type never count as inherited
    pub root_type: String,
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            scope: HidingScope::PerClass,
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            parallel: true,
        }
    }
}

/// Metrics of a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub dit: usize,
    pub noc: usize,
    pub mhf: f64,
    pub mif: f64,
    pub ahf: f64,
    pub aif: f64,
    pub pof: f64,
    pub members: MemberCounts,
    pub overrides: OverrideCounts,
}

impl ClassMetrics {
    pub fn hiding_factors(&self) -> HidingFactors {
        HidingFactors {
            mhf: self.mhf,
            mif: self.mif,
            ahf: self.ahf,
            aif: self.aif,
        }
    }

    fn with_hiding_factors(mut self, factors: HidingFactors) -> Self {
        self.mhf = factors.mhf;
        self.mif = factors.mif;
        self.ahf = factors.ahf;
        self.aif = factors.aif;
        self
    }
}

/// Per-class record: metrics, or the reason this class could not be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ClassOutcome {
    Evaluated(ClassMetrics),
    Failed { class: String, error: String },
}

impl ClassOutcome {
    pub fn class(&self) -> &str {
        match self {
            Self::Evaluated(metrics) => &metrics.class,
            Self::Failed { class, .. } => class,
        }
    }

    pub fn metrics(&self) -> Option<&ClassMetrics> {
        match self {
            Self::Evaluated(metrics) => Some(metrics),
            Self::Failed { .. } => None,
        }
    }
}

/// Running sums for the universe formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub evaluated: usize,
    pub failed: usize,
    pub dit: usize,
    pub noc: usize,
    pub members: MemberCounts,
    pub overrides: OverrideCounts,
}

impl Totals {
    pub fn record(self, outcome: &ClassOutcome) -> Self {
        match outcome {
            ClassOutcome::Evaluated(metrics) => Self {
                evaluated: self.evaluated + 1,
                dit: self.dit + metrics.dit,
                noc: self.noc + metrics.noc,
                members: self.members.merge(metrics.members),
                overrides: self.overrides.merge(metrics.overrides),
                ..self
            },
            ClassOutcome::Failed { .. } => Self {
                failed: self.failed + 1,
                ..self
            },
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            evaluated: self.evaluated + other.evaluated,
            failed: self.failed + other.failed,
            dit: self.dit + other.dit,
            noc: self.noc + other.noc,
            members: self.members.merge(other.members),
            overrides: self.overrides.merge(other.overrides),
        }
    }

    /// Universe-wide record. Undefined when no class was evaluated.
    pub fn aggregate(&self) -> Result<AggregateMetrics> {
        if self.evaluated == 0 {
            return Err(Error::EmptyUniverse);
        }
        let factors = HidingFactors::from_counts(&self.members);
        Ok(AggregateMetrics {
            classes: self.evaluated,
            failed: self.failed,
            average_dit: self.dit as f64 / self.evaluated as f64,
            total_noc: self.noc,
            mhf: factors.mhf,
            mif: factors.mif,
            ahf: factors.ahf,
            aif: factors.aif,
            pof: ratio(
                self.overrides.overridden_methods,
                self.overrides.opportunities,
            ),
        })
    }
}

/// Aggregate record over every evaluated class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub classes: usize,
    pub failed: usize,
    pub average_dit: f64,
    pub total_noc: usize,
    pub mhf: f64,
    pub mif: f64,
    pub ahf: f64,
    pub aif: f64,
    pub pof: f64,
}

/// Output of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub scope: HidingScope,
    /// One record per class, ordered by qualified name
    pub classes: Vec<ClassOutcome>,
    /// Absent when every class failed
    pub aggregate: Option<AggregateMetrics>,
    /// Non-fatal problems (missing superclass descriptors)
    pub diagnostics: Vec<String>,
}

impl MetricsReport {
    pub fn evaluated(&self) -> impl Iterator<Item = &ClassMetrics> {
        self.classes.iter().filter_map(ClassOutcome::metrics)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.classes.iter().filter_map(|outcome| match outcome {
            ClassOutcome::Failed { class, error } => Some((class.as_str(), error.as_str())),
            ClassOutcome::Evaluated(_) => None,
        })
    }
}

/// Compute every per-class metric of `class`.
pub fn evaluate_class<'u>(
    graph: &InheritanceGraph<'u>,
    class: &'u ClassDescriptor,
    root_type: &str,
) -> Result<ClassMetrics> {
    let dit = graph.calculate_dit(&class.name)?;
    let noc = graph.calculate_noc(&class.name)?;
    let members = MemberView::resolve(graph, class, root_type)?.counts();
    let overrides = OverrideCounts::for_class(graph, class)?;
    let factors = HidingFactors::from_counts(&members);

    Ok(ClassMetrics {
        class: class.name.clone(),
        dit,
        noc,
        mhf: factors.mhf,
        mif: factors.mif,
        ahf: factors.ahf,
        aif: factors.aif,
        pof: overrides.pof(),
        members,
        overrides,
    })
}

fn evaluate_outcome<'u>(
    graph: &InheritanceGraph<'u>,
    class: &'u ClassDescriptor,
    root_type: &str,
) -> ClassOutcome {
    match evaluate_class(graph, class, root_type) {
        Ok(metrics) => ClassOutcome::Evaluated(metrics),
        Err(error) => {
            if error.is_recoverable() {
                warn!(class = %class.name, %error, "Skipping class");
            } else {
                error!(class = %class.name, %error, "Class evaluation failed");
            }
            ClassOutcome::Failed {
                class: class.name.clone(),
                error: error.to_string(),
            }
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    outcomes: Vec<ClassOutcome>,
    totals: Totals,
}

impl Accumulator {
    fn push(mut self, outcome: ClassOutcome) -> Self {
        self.totals = self.totals.record(&outcome);
        self.outcomes.push(outcome);
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.totals = self.totals.merge(other.totals);
        self.outcomes.extend(other.outcomes);
        self
    }
}

/// Run the full metrics pass over `universe`.
///
/// Fails only for an empty universe. Classes caught in an inheritance cycle
/// are reported as [`ClassOutcome::Failed`] and left out of the aggregate.
pub fn analyze_universe(universe: &Universe, options: &AnalysisOptions) -> Result<MetricsReport> {
    if universe.is_empty() {
        return Err(Error::EmptyUniverse);
    }

    let graph = InheritanceGraph::build(universe);
    let _span = info_span!(
        "metrics_pass",
        classes = universe.len(),
        parallel = options.parallel,
        scope = %options.scope
    )
    .entered();

    let classes: Vec<&ClassDescriptor> = universe.classes().collect();
    let root_type = options.root_type.as_str();

    let accumulator = if options.parallel {
        classes
            .par_iter()
            .map(|&class| evaluate_outcome(&graph, class, root_type))
            .fold(Accumulator::default, Accumulator::push)
            .reduce(Accumulator::default, Accumulator::merge)
    } else {
        classes
            .iter()
            .map(|&class| evaluate_outcome(&graph, class, root_type))
            .fold(Accumulator::default(), Accumulator::push)
    };

    let Accumulator {
        mut outcomes,
        totals,
    } = accumulator;
    outcomes.sort_by(|a, b| a.class().cmp(b.class()));

    let aggregate = totals.aggregate().ok();
    if let (HidingScope::Universe, Some(aggregate)) = (options.scope, aggregate.as_ref()) {
        let factors = HidingFactors {
            mhf: aggregate.mhf,
            mif: aggregate.mif,
            ahf: aggregate.ahf,
            aif: aggregate.aif,
        };
        outcomes = outcomes
            .into_iter()
            .map(|outcome| match outcome {
                ClassOutcome::Evaluated(metrics) => {
                    ClassOutcome::Evaluated(metrics.with_hiding_factors(factors))
                }
                failed => failed,
            })
            .collect();
    }

    debug!(
        evaluated = totals.evaluated,
        failed = totals.failed,
        "Metrics pass complete"
    );

    Ok(MetricsReport {
        scope: options.scope,
        classes: outcomes,
        aggregate,
        diagnostics: graph.diagnostics().iter().map(ToString::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MethodDescriptor, Visibility};

    fn sequential(scope: HidingScope) -> AnalysisOptions {
        AnalysisOptions {
            scope,
            parallel: false,
            ..AnalysisOptions::default()
        }
    }

    fn two_level_universe() -> Universe {
        vec![
            ClassDescriptor::new("a.Base")
                .with_method(MethodDescriptor::new("run", Visibility::Public))
                .with_method(MethodDescriptor::new("prepare", Visibility::Private)),
            ClassDescriptor::new("a.Impl")
                .extends("a.Base")
                .with_method(MethodDescriptor::new("run", Visibility::Public)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_empty_universe_fails_fast() {
        let result = analyze_universe(&Universe::new(), &sequential(HidingScope::PerClass));
        assert!(matches!(result, Err(Error::EmptyUniverse)));
    }

    #[test]
    fn test_totals_aggregate_requires_evaluated_classes() {
        assert!(matches!(Totals::default().aggregate(), Err(Error::EmptyUniverse)));
    }

    #[test]
    fn test_aggregate_sums() {
        let report =
            analyze_universe(&two_level_universe(), &sequential(HidingScope::PerClass)).unwrap();
        let aggregate = report.aggregate.unwrap();

        assert_eq!(aggregate.classes, 2);
        assert_eq!(aggregate.average_dit, 0.5);
        assert_eq!(aggregate.total_noc, 1);
        // 1 hidden of 3 declared methods
        assert!((aggregate.mhf - 1.0 / 3.0).abs() < 1e-12);
        // Impl sees run (declared) only: prepare is private
        assert_eq!(aggregate.mif, 0.0);
        assert_eq!(aggregate.pof, 0.5);
    }

    #[test]
    fn test_universe_scope_repeats_aggregate_factors() {
        let report =
            analyze_universe(&two_level_universe(), &sequential(HidingScope::Universe)).unwrap();
        let aggregate = report.aggregate.clone().unwrap();

        for metrics in report.evaluated() {
            assert_eq!(metrics.mhf, aggregate.mhf);
            assert_eq!(metrics.aif, aggregate.aif);
        }
        // DIT/NOC/POF stay per class
        let base = report.evaluated().find(|m| m.class == "a.Base").unwrap();
        assert_eq!(base.pof, 0.5);
    }

    #[test]
    fn test_cycle_reports_remaining_classes() {
        let universe: Universe = vec![
            ClassDescriptor::new("a.X").extends("a.Y"),
            ClassDescriptor::new("a.Y").extends("a.X"),
            ClassDescriptor::new("a.Z"),
        ]
        .into_iter()
        .collect();

        let report = analyze_universe(&universe, &sequential(HidingScope::PerClass)).unwrap();

        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.evaluated().count(), 1);
        let aggregate = report.aggregate.unwrap();
        assert_eq!(aggregate.classes, 1);
        assert_eq!(aggregate.failed, 2);
    }

    #[test]
    fn test_all_failed_has_no_aggregate() {
        let universe: Universe = vec![ClassDescriptor::new("a.Loop").extends("a.Loop")]
            .into_iter()
            .collect();

        let report = analyze_universe(&universe, &sequential(HidingScope::PerClass)).unwrap();
        assert!(report.aggregate.is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let universe = two_level_universe();
        let parallel = AnalysisOptions::default();

        assert_eq!(
            analyze_universe(&universe, &parallel).unwrap(),
            analyze_universe(&universe, &sequential(HidingScope::PerClass)).unwrap()
        );
    }
}

//! Override detection and the Polymorphism Factor (POF).

use super::ratio;
use crate::core::{ClassDescriptor, Result, Signature};
use crate::graph::InheritanceGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Realised and possible overrides of one class's declared methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideCounts {
    /// Declared methods re-declared by a direct child, summed over children
    pub overridden_methods: usize,
    /// Declared methods times number of direct children
    pub opportunities: usize,
}

impl OverrideCounts {
    pub fn for_class<'u>(graph: &InheritanceGraph<'u>, class: &'u ClassDescriptor) -> Result<Self> {
        let children = graph.calculate_noc(&class.name)?;
        Ok(Self {
            overridden_methods: count_overridden_methods(graph, class)?,
            opportunities: class.methods.len() * children,
        })
    }

    pub fn pof(&self) -> f64 {
        ratio(self.overridden_methods, self.opportunities)
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            overridden_methods: self.overridden_methods + other.overridden_methods,
            opportunities: self.opportunities + other.opportunities,
        }
    }
}

/// Count declared methods of `class` that its direct children override.
///
/// A child overrides a method when it declares a non-private method with the
/// same name and parameter types. Each child is counted separately, and
/// grandchildren are left to their own parent's count.
pub fn count_overridden_methods<'u>(
    graph: &InheritanceGraph<'u>,
    class: &'u ClassDescriptor,
) -> Result<usize> {
    graph.calculate_noc(&class.name)?;

    let overridden = graph
        .children_of(&class.name)
        .iter()
        .filter_map(|child| graph.universe().get(child))
        .map(|child| {
            let redeclared: HashSet<Signature<'_>> = child
                .methods
                .iter()
                .filter(|m| !m.visibility.is_private())
                .map(|m| m.signature())
                .collect();
            class
                .methods
                .iter()
                .filter(|m| redeclared.contains(&m.signature()))
                .count()
        })
        .sum();

    Ok(overridden)
}

/// POF(c) = overridden / (declared methods × direct children), 0 when either
/// factor of the denominator is 0.
pub fn calculate_pof<'u>(graph: &InheritanceGraph<'u>, class: &'u ClassDescriptor) -> Result<f64> {
    OverrideCounts::for_class(graph, class).map(|counts| counts.pof())
}

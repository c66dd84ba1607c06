//! Method/Attribute Hiding and Inheritance Factors (MHF, AHF, MIF, AIF).
//!
//! Every factor is a ratio of member counts, so the per-class and the
//! whole-universe variants share one formula: per-class factors divide the
//! counts of a single class, universe factors divide the summed counts of
//! every evaluated class.

use super::ratio;
use crate::core::{ClassDescriptor, FieldDescriptor, MethodDescriptor, Result, Signature};
use crate::graph::InheritanceGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declared and inherited members of one class.
///
/// `inherited` never contains a member whose key (method signature or field
/// name) is declared by the class itself, so the two sets are disjoint and
/// `declared + inherited = all visible`.
#[derive(Debug, Clone)]
pub struct MemberView<'u> {
    pub declared_methods: &'u [MethodDescriptor],
    pub inherited_methods: Vec<&'u MethodDescriptor>,
    pub declared_fields: &'u [FieldDescriptor],
    pub inherited_fields: Vec<&'u FieldDescriptor>,
}

impl<'u> MemberView<'u> {
    /// Resolve the members visible in `class`.
    ///
    /// Ancestors are walked nearest first; a member is inherited when its
    /// visibility crosses into `class` and no nearer class already provides
    /// the same key. Members of `root_type` are never counted.
    pub fn resolve(
        graph: &InheritanceGraph<'u>,
        class: &'u ClassDescriptor,
        root_type: &str,
    ) -> Result<Self> {
        let ancestors = graph.ancestors(&class.name)?;
        let package = class.package();

        let mut seen_methods: HashSet<Signature<'u>> =
            class.methods.iter().map(MethodDescriptor::signature).collect();
        let mut seen_fields: HashSet<&'u str> =
            class.fields.iter().map(|f| f.name.as_str()).collect();

        let mut inherited_methods = Vec::new();
        let mut inherited_fields = Vec::new();

        for ancestor in ancestors.into_iter().filter(|a| a.name != root_type) {
            let same_package = ancestor.package() == package;

            for method in &ancestor.methods {
                if method.visibility.is_inheritable(same_package)
                    && seen_methods.insert(method.signature())
                {
                    inherited_methods.push(method);
                }
            }
            for field in &ancestor.fields {
                if field.visibility.is_inheritable(same_package)
                    && seen_fields.insert(field.name.as_str())
                {
                    inherited_fields.push(field);
                }
            }
        }

        Ok(Self {
            declared_methods: &class.methods,
            inherited_methods,
            declared_fields: &class.fields,
            inherited_fields,
        })
    }

    pub fn counts(&self) -> MemberCounts {
        MemberCounts {
            declared_methods: self.declared_methods.len(),
            hidden_methods: self
                .declared_methods
                .iter()
                .filter(|m| !m.visibility.is_public())
                .count(),
            visible_methods: self.declared_methods.len() + self.inherited_methods.len(),
            declared_fields: self.declared_fields.len(),
            hidden_fields: self
                .declared_fields
                .iter()
                .filter(|f| !f.visibility.is_public())
                .count(),
            visible_fields: self.declared_fields.len() + self.inherited_fields.len(),
        }
    }
}

/// Member counts behind the hiding and inheritance factors.
///
/// Counts are additive: summing the counts of many classes gives the
/// numerators and denominators of the universe-wide factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub declared_methods: usize,
    /// Declared methods that are not public
    pub hidden_methods: usize,
    /// Declared plus inherited methods
    pub visible_methods: usize,
    pub declared_fields: usize,
    /// Declared fields that are not public
    pub hidden_fields: usize,
    /// Declared plus inherited fields
    pub visible_fields: usize,
}

impl MemberCounts {
    pub fn inherited_methods(&self) -> usize {
        self.visible_methods - self.declared_methods
    }

    pub fn inherited_fields(&self) -> usize {
        self.visible_fields - self.declared_fields
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            declared_methods: self.declared_methods + other.declared_methods,
            hidden_methods: self.hidden_methods + other.hidden_methods,
            visible_methods: self.visible_methods + other.visible_methods,
            declared_fields: self.declared_fields + other.declared_fields,
            hidden_fields: self.hidden_fields + other.hidden_fields,
            visible_fields: self.visible_fields + other.visible_fields,
        }
    }
}

/// The four MOOD hiding/inheritance ratios, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HidingFactors {
    pub mhf: f64,
    pub mif: f64,
    pub ahf: f64,
    pub aif: f64,
}

impl HidingFactors {
    pub fn from_counts(counts: &MemberCounts) -> Self {
        Self {
            mhf: ratio(counts.hidden_methods, counts.declared_methods),
            mif: ratio(counts.inherited_methods(), counts.visible_methods),
            ahf: ratio(counts.hidden_fields, counts.declared_fields),
            aif: ratio(counts.inherited_fields(), counts.visible_fields),
        }
    }
}

/// Per-class hiding and inheritance factors for `class`.
pub fn calculate_hiding_factors<'u>(
    graph: &InheritanceGraph<'u>,
    class: &'u ClassDescriptor,
    root_type: &str,
) -> Result<HidingFactors> {
    let view = MemberView::resolve(graph, class, root_type)?;
    Ok(HidingFactors::from_counts(&view.counts()))
}

/// Universe-wide factors: ratios of member counts summed over `classes`.
///
/// Classes whose hierarchy cannot be resolved are skipped.
pub fn universe_hiding_factors<'u, I>(
    graph: &InheritanceGraph<'u>,
    classes: I,
    root_type: &str,
) -> HidingFactors
where
    I: IntoIterator<Item = &'u ClassDescriptor>,
{
    let totals = classes
        .into_iter()
        .filter_map(|class| MemberView::resolve(graph, class, root_type).ok())
        .map(|view| view.counts())
        .fold(MemberCounts::default(), MemberCounts::merge);
    HidingFactors::from_counts(&totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Universe, Visibility};

    const ROOT: &str = "java.lang.Object";

    fn method(name: &str, visibility: Visibility) -> MethodDescriptor {
        MethodDescriptor::new(name, visibility)
    }

    fn field(name: &str, visibility: Visibility) -> FieldDescriptor {
        FieldDescriptor::new(name, "int", visibility)
    }

    #[test]
    fn test_mhf_counts_all_non_public_declared() {
        let universe: Universe = vec![ClassDescriptor::new("a.A")
            .with_method(method("open", Visibility::Public))
            .with_method(method("helper", Visibility::Private))
            .with_method(method("hook", Visibility::Protected))
            .with_method(method("internal", Visibility::Package))]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let factors = calculate_hiding_factors(&graph, universe.get("a.A").unwrap(), ROOT).unwrap();
        assert_eq!(factors.mhf, 0.75);
        assert_eq!(factors.mif, 0.0);
    }

    #[test]
    fn test_zero_members_yield_zero_factors() {
        let universe: Universe = vec![ClassDescriptor::new("a.Empty")].into_iter().collect();
        let graph = InheritanceGraph::build(&universe);

        let factors =
            calculate_hiding_factors(&graph, universe.get("a.Empty").unwrap(), ROOT).unwrap();
        assert_eq!(factors, HidingFactors::default());
    }

    #[test]
    fn test_overridden_method_is_declared_not_inherited() {
        let universe: Universe = vec![
            ClassDescriptor::new("a.Base")
                .with_method(method("run", Visibility::Public))
                .with_method(method("stop", Visibility::Public))
                .with_method(method("secret", Visibility::Private)),
            ClassDescriptor::new("a.Derived")
                .extends("a.Base")
                .with_method(method("run", Visibility::Public)),
        ]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let view = MemberView::resolve(&graph, universe.get("a.Derived").unwrap(), ROOT).unwrap();
        let inherited: Vec<_> = view.inherited_methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(inherited, vec!["stop"]);

        let counts = view.counts();
        assert_eq!(counts.visible_methods, 2);
        assert_eq!(counts.inherited_methods(), 1);
    }

    #[test]
    fn test_package_private_members_stop_at_package_boundary() {
        let universe: Universe = vec![
            ClassDescriptor::new("a.Base")
                .with_method(method("local", Visibility::Package))
                .with_field(field("count", Visibility::Package)),
            ClassDescriptor::new("a.Same").extends("a.Base"),
            ClassDescriptor::new("b.Other").extends("a.Base"),
        ]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let same = MemberView::resolve(&graph, universe.get("a.Same").unwrap(), ROOT).unwrap();
        let other = MemberView::resolve(&graph, universe.get("b.Other").unwrap(), ROOT).unwrap();

        assert_eq!(same.counts().inherited_methods(), 1);
        assert_eq!(same.counts().inherited_fields(), 1);
        assert_eq!(other.counts().inherited_methods(), 0);
        assert_eq!(other.counts().inherited_fields(), 0);
    }

    #[test]
    fn test_root_type_members_are_excluded() {
        let universe: Universe = vec![
            ClassDescriptor::new(ROOT)
                .with_method(method("hashCode", Visibility::Public))
                .with_method(method("toString", Visibility::Public)),
            ClassDescriptor::new("a.A")
                .extends(ROOT)
                .with_method(method("run", Visibility::Public)),
        ]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let factors = calculate_hiding_factors(&graph, universe.get("a.A").unwrap(), ROOT).unwrap();
        assert_eq!(factors.mif, 0.0);
    }

    #[test]
    fn test_field_shadowing_by_name() {
        let universe: Universe = vec![
            ClassDescriptor::new("a.Base")
                .with_field(field("id", Visibility::Public))
                .with_field(field("name", Visibility::Protected)),
            ClassDescriptor::new("a.Derived")
                .extends("a.Base")
                .with_field(FieldDescriptor::new("id", "long", Visibility::Private)),
        ]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let factors =
            calculate_hiding_factors(&graph, universe.get("a.Derived").unwrap(), ROOT).unwrap();
        assert_eq!(factors.ahf, 1.0);
        assert_eq!(factors.aif, 0.5);
    }

    #[test]
    fn test_universe_factors_divide_summed_counts() {
        let universe: Universe = vec![
            ClassDescriptor::new("a.A")
                .with_method(method("x", Visibility::Private))
                .with_method(method("y", Visibility::Public)),
            ClassDescriptor::new("a.B").with_method(method("z", Visibility::Public)),
            ClassDescriptor::new("a.C"),
        ]
        .into_iter()
        .collect();
        let graph = InheritanceGraph::build(&universe);

        let factors = universe_hiding_factors(&graph, universe.classes(), ROOT);
        // 1 hidden of 3 declared, not the mean of the per-class ratios
        assert!((factors.mhf - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}

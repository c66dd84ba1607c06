//! Inheritance graph over a [`Universe`].
//!
//! The graph is built once per run: superclass lookups, child lists and
//! inheritance depths are all precomputed so that the per-class calculators
//! only ever do O(1) lookups against shared, read-only state.

use crate::core::{ClassDescriptor, Error, Result, Universe};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info_span, warn};

/// Precomputed position of a class in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Depth {
    Known(usize),
    /// The superclass chain runs into this cycle
    Cyclic(Vec<String>),
}

impl Depth {
    fn shifted(&self, hops: usize) -> Depth {
        match self {
            Depth::Known(depth) => Depth::Known(depth + hops),
            Depth::Cyclic(cycle) => Depth::Cyclic(cycle.clone()),
        }
    }
}

/// Parent/child relation between the classes of one universe.
#[derive(Debug)]
pub struct InheritanceGraph<'u> {
    universe: &'u Universe,
    children: HashMap<&'u str, Vec<&'u str>>,
    depths: HashMap<&'u str, Depth>,
    diagnostics: Vec<Error>,
}

impl<'u> InheritanceGraph<'u> {
    /// Build the graph for a universe.
    ///
    /// Cycles and unresolved superclasses do not fail the build: cyclic
    /// classes fail individually in [`calculate_dit`](Self::calculate_dit)
    /// and [`calculate_noc`](Self::calculate_noc), and unresolved superclasses
    /// are recorded as [`diagnostics`](Self::diagnostics).
    pub fn build(universe: &'u Universe) -> Self {
        let _span = info_span!("inheritance_graph", classes = universe.len()).entered();

        let mut graph = Self {
            universe,
            children: HashMap::with_capacity(universe.len()),
            depths: HashMap::with_capacity(universe.len()),
            diagnostics: Vec::new(),
        };

        for class in universe.classes() {
            graph.link_superclass(class);
        }
        for name in universe.names() {
            graph.resolve_depth(name);
        }

        let cyclic = graph
            .depths
            .values()
            .filter(|d| matches!(d, Depth::Cyclic(_)))
            .count();
        if cyclic > 0 {
            warn!(cyclic, "Inheritance cycles detected");
        }
        debug!(
            edges = graph.children.values().map(Vec::len).sum::<usize>(),
            cyclic,
            missing = graph.diagnostics.len(),
            "Inheritance graph built"
        );

        graph
    }

    fn link_superclass(&mut self, class: &'u ClassDescriptor) {
        let Some(superclass) = class.superclass.as_deref() else {
            return;
        };

        if self.universe.contains(superclass) {
            self.children
                .entry(superclass)
                .or_default()
                .push(class.name.as_str());
        } else if class.superclass_unresolved {
            warn!(
                class = %class.name,
                superclass,
                "Superclass descriptor missing, treating as universe boundary"
            );
            self.diagnostics.push(Error::MissingDescriptor {
                class: class.name.clone(),
                superclass: superclass.to_string(),
            });
        }
    }

    /// Walk up from `name` until a known depth, the universe boundary or a
    /// cycle, then assign depths to every class on the walked path.
    fn resolve_depth(&mut self, name: &'u str) {
        if self.depths.contains_key(name) {
            return;
        }

        let universe = self.universe;
        let mut path: Vec<&'u str> = Vec::new();
        let mut on_path: HashSet<&'u str> = HashSet::new();
        let mut current = name;

        // Depth of the last class on the path
        let tail = loop {
            path.push(current);
            on_path.insert(current);

            let superclass = universe
                .get(current)
                .and_then(|class| class.superclass.as_deref());

            match superclass {
                None => break Depth::Known(0),
                Some(parent) if !universe.contains(parent) => break Depth::Known(1),
                Some(parent) => {
                    if let Some(known) = self.depths.get(parent) {
                        break known.shifted(1);
                    }
                    if on_path.contains(parent) {
                        let start = path.iter().position(|p| *p == parent).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|p| p.to_string()).collect();
                        cycle.push(parent.to_string());
                        break Depth::Cyclic(cycle);
                    }
                    current = parent;
                }
            }
        };

        let last = path.len() - 1;
        for (index, class) in path.into_iter().enumerate() {
            self.depths.insert(class, tail.shifted(last - index));
        }
    }

    pub fn universe(&self) -> &'u Universe {
        self.universe
    }

    /// In-universe superclass of `name`, if any.
    pub fn superclass_of(&self, name: &str) -> Option<&'u ClassDescriptor> {
        self.universe
            .get(name)
            .and_then(|class| class.superclass.as_deref())
            .and_then(|superclass| self.universe.get(superclass))
    }

    /// Direct children of `name`, ordered by qualified name.
    pub fn children_of(&self, name: &str) -> &[&'u str] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// In-universe ancestors of `name`, nearest first.
    pub fn ancestors(&self, name: &str) -> Result<Vec<&'u ClassDescriptor>> {
        self.check_acyclic(name)?;

        let mut ancestors = Vec::new();
        let mut current = name;
        while let Some(parent) = self.superclass_of(current) {
            ancestors.push(parent);
            current = &parent.name;
        }
        Ok(ancestors)
    }

    /// Depth of Inheritance Tree: superclass hops until the chain ends.
    ///
    /// A superclass outside the universe counts as one final hop.
    pub fn calculate_dit(&self, name: &str) -> Result<usize> {
        match self.depths.get(name) {
            Some(Depth::Known(depth)) => Ok(*depth),
            Some(Depth::Cyclic(cycle)) => Err(cyclic_error(name, cycle)),
            None => Err(Error::UnknownClass(name.to_string())),
        }
    }

    /// Number of Children: classes whose direct superclass is `name`.
    pub fn calculate_noc(&self, name: &str) -> Result<usize> {
        self.check_acyclic(name)?;
        Ok(self.children_of(name).len())
    }

    fn check_acyclic(&self, name: &str) -> Result<()> {
        self.calculate_dit(name).map(|_| ())
    }

    /// Fail with the first cycle found, in qualified-name order.
    pub fn ensure_acyclic(&self) -> Result<()> {
        self.universe
            .names()
            .try_for_each(|name| self.check_acyclic(name))
    }

    /// Non-fatal problems found while building (missing superclasses).
    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }
}

fn cyclic_error(name: &str, cycle: &[String]) -> Error {
    Error::CyclicHierarchy {
        class: name.to_string(),
        cycle: cycle.to_vec(),
    }
}

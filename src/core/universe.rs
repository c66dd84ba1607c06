use crate::core::ClassDescriptor;
use std::collections::BTreeMap;
use tracing::warn;

/// The finite set of class descriptors analysed in one run.
///
/// Keys are qualified names; iteration is ordered by name so every pass over
/// the universe is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    classes: BTreeMap<String, ClassDescriptor>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. Returns `false` (and keeps the existing entry)
    /// when a class with the same qualified name is already present.
    pub fn insert(&mut self, mut class: ClassDescriptor) -> bool {
        if self.classes.contains_key(&class.name) {
            warn!(class = %class.name, "Duplicate class descriptor ignored");
            return false;
        }
        class.normalize_owners();
        self.classes.insert(class.name.clone(), class);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl FromIterator<ClassDescriptor> for Universe {
    fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
        iter.into_iter().fold(Universe::new(), |mut universe, class| {
            universe.insert(class);
            universe
        })
    }
}

//! Linearized supertype sets.
//!
//! A [`SupertypeSet`] is the deterministic total order of a class and all
//! of its transitive supertypes: the class's own instantiation first, then
//! its direct supertype, its direct interfaces in declaration order, then
//! the recursive linearizations of each of those, with the root class
//! exactly once at the end. Each class identity appears at most once; when
//! the same generic class is reachable along several paths with different
//! type arguments, the earliest-encountered (most specific) instantiation
//! wins.

use rustc_hash::FxHashSet;
use vela_core::ClassId;

use crate::types::ResolvedType;

/// The ordered set of a class's supertypes, including itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SupertypeSet {
    types: Vec<ResolvedType>,
}

impl SupertypeSet {
    /// All entries: self first, root last.
    pub fn types(&self) -> &[ResolvedType] {
        &self.types
    }

    /// Entries excluding the class itself.
    pub fn supertypes(&self) -> &[ResolvedType] {
        &self.types[1..]
    }

    /// Number of entries, including self.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// A linearization always contains at least the class itself.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether the set contains an instantiation of `class`.
    pub fn contains_class(&self, class: ClassId) -> bool {
        self.instantiation_of(class).is_some()
    }

    /// The (single) instantiation of `class` in the set, if present.
    pub fn instantiation_of(&self, class: ClassId) -> Option<&ResolvedType> {
        self.types.iter().find(|t| t.class_id() == Some(class))
    }

    /// The class ids in linearization order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.types.iter().filter_map(|t| t.class_id())
    }
}

/// Accumulates a [`SupertypeSet`] in insertion order while deduplicating
/// by class identity. The root class is withheld during accumulation and
/// appended once at the end.
pub struct SupertypeSetBuilder {
    root: ClassId,
    self_class: ClassId,
    order: Vec<ResolvedType>,
    seen: FxHashSet<ClassId>,
}

impl SupertypeSetBuilder {
    /// Start a set for the class whose instantiation is `this_type`.
    ///
    /// # Panics
    ///
    /// Panics if `this_type` is not an instantiation; a class's own type
    /// always is.
    pub fn new(this_type: ResolvedType, root: ClassId) -> Self {
        let self_class = this_type
            .class_id()
            .expect("a class's own type is an instantiation");
        let mut seen = FxHashSet::default();
        seen.insert(self_class);
        Self { root, self_class, order: vec![this_type], seen }
    }

    /// Add one supertype entry. Non-instantiations (malformed, dynamic)
    /// are ignored; the root is deferred to the end; duplicates keep
    /// their first instantiation.
    pub fn add(&mut self, entry: &ResolvedType) {
        let Some(class) = entry.class_id() else {
            return;
        };
        if class == self.root {
            return;
        }
        if self.seen.insert(class) {
            self.order.push(entry.clone());
        }
    }

    /// Finish the set, appending `root_type` unless the class is the root
    /// itself.
    pub fn finish(mut self, root_type: ResolvedType) -> SupertypeSet {
        if self.self_class != self.root {
            self.order.push(root_type);
        }
        SupertypeSet { types: self.order }
    }
}

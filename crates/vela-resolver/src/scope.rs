//! Name resolution façade.
//!
//! Resolves simple and prefixed identifiers against a library's
//! materialized scope (own declarations plus unprefixed imports, as an
//! O(1) map) and the type parameters of an enclosing class. The façade
//! itself never reports; it returns a typed outcome that the
//! type-expression resolver turns into diagnostics.

use rustc_hash::FxHashMap;
use vela_core::{ClassId, LibraryId};

/// What an identifier resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A class-like declaration.
    Class(ClassId),
    /// A type parameter of the enclosing class.
    TypeParam {
        /// The declaring class.
        owner: ClassId,
        /// Index in the owner's parameter list.
        index: u16,
    },
}

/// Why an identifier failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No declaration with that name is in scope.
    NotFound,
    /// The receiver of a dotted form is not an import prefix.
    NotAPrefix {
        /// The non-prefix receiver as written.
        prefix: String,
    },
    /// The name resolved to something that is not a type-like
    /// declaration (e.g. an import prefix used bare).
    NotAType {
        /// The offending name.
        name: String,
    },
}

/// Materialized view of the names visible in one library without
/// qualification, plus its import prefixes.
#[derive(Debug, Default)]
pub struct LibraryScope {
    types: FxHashMap<String, ClassId>,
    prefixes: FxHashMap<String, LibraryId>,
}

impl LibraryScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a type name. The first binding wins; later ones (duplicate
    /// declarations, shadowed imports) are ignored.
    pub fn define(&mut self, name: impl Into<String>, class: ClassId) {
        self.types.entry(name.into()).or_insert(class);
    }

    /// Bind an import prefix.
    pub fn define_prefix(&mut self, name: impl Into<String>, library: LibraryId) {
        self.prefixes.entry(name.into()).or_insert(library);
    }

    /// Look up an unqualified type name.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.types.get(name).copied()
    }

    /// Look up an import prefix.
    pub fn lookup_prefix(&self, name: &str) -> Option<LibraryId> {
        self.prefixes.get(name).copied()
    }

    /// Whether a name is bound as a prefix.
    pub fn is_prefix(&self, name: &str) -> bool {
        self.prefixes.contains_key(name)
    }
}

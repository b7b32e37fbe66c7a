//! Resolution context: the mutable world the passes operate on.
//!
//! Owns the class store, the libraries (scopes plus the per-library
//! mixin-application interning tables), the diagnostic and feature sinks,
//! and the resolver configuration. Everything runs on a single logical
//! thread; the context has exactly one writer at a time and needs no
//! locks.

use rustc_hash::FxHashMap;
use vela_core::{ClassId, Diagnostic, Diagnostics, FeatureLog, LibraryId, Span};

use crate::element::{ClassKind, ClassRecord, ClassStore};
use crate::scope::{Binding, LibraryScope, LookupError};

/// Which mixin-application interning strategy the resolver uses.
///
/// Both strategies produce hierarchies with the same observable semantics;
/// sharing exists to keep the synthetic hierarchy bit-identical across
/// compilations that demand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixinSharing {
    /// Every application gets its own intermediates (the default).
    #[default]
    PerApplication,
    /// Intermediates are interned per library by structural signature.
    SharedPerLibrary,
}

/// Resolver configuration, passed in explicitly by the driver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Name of the root class (top of the hierarchy).
    pub root_class: String,
    /// Name of the platform core library; it defines the root and the
    /// restricted platform types, and is exempt from the restriction.
    pub core_library: String,
    /// Mixin-application interning strategy.
    pub mixin_sharing: MixinSharing,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_class: "Object".to_string(),
            core_library: "core".to_string(),
            mixin_sharing: MixinSharing::default(),
        }
    }
}

/// Host hooks a backend can override.
pub trait Backend {
    /// The superclass a class without an extends clause gets. Backends
    /// may redirect this (e.g. to insert an interceptor class).
    fn default_superclass(&self, class: &ClassRecord, root: ClassId) -> ClassId {
        let _ = class;
        root
    }

    /// Whether a library is a backend-internal target library, exempt
    /// from the platform-type restriction.
    fn is_target_specific_library(&self, library_name: &str) -> bool {
        let _ = library_name;
        false
    }
}

/// The no-op backend: default superclass is the root, no target
/// libraries.
#[derive(Debug, Default)]
pub struct DefaultBackend;

impl Backend for DefaultBackend {}

/// Platform types that user libraries may not extend, implement, or mix
/// in. The dynamic type is restricted as well but is a sentinel rather
/// than a class.
const RESTRICTED_PLATFORM_TYPES: &[&str] = &["bool", "num", "int", "double", "String", "Null"];

/// One library: scope, declarations, and the mixin-application interning
/// table.
#[derive(Debug)]
pub struct Library {
    /// Stable identity.
    pub id: LibraryId,
    /// Library name.
    pub name: String,
    /// Materialized scope (own declarations + unprefixed imports).
    pub scope: LibraryScope,
    /// Own top-level declarations, in declaration order.
    pub declared: Vec<(String, ClassId)>,
    /// Interning table for shared synthetic mixin applications:
    /// structural signature → synthetic class.
    pub mixin_applications: FxHashMap<String, ClassId>,
}

impl Library {
    fn new(id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            scope: LibraryScope::new(),
            declared: Vec::new(),
            mixin_applications: FxHashMap::default(),
        }
    }

    /// Look up an own declaration by name.
    pub fn declaration(&self, name: &str) -> Option<ClassId> {
        self.declared
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

/// Deferred checks queued during class resolution and flushed by the
/// driver once the subject class is done.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DeferredCheck {
    /// Walk the bound chain of one type variable looking for a cycle.
    BoundCycle {
        class: ClassId,
        index: u16,
    },
}

/// The mutable state shared by the resolution passes.
pub struct ResolutionContext<'b> {
    /// Configuration.
    pub config: ResolverConfig,
    pub(crate) backend: &'b dyn Backend,
    pub(crate) store: ClassStore,
    pub(crate) libraries: Vec<Library>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) registry: FeatureLog,
    pub(crate) deferred: Vec<DeferredCheck>,
    root: ClassId,
    core_library: LibraryId,
}

impl<'b> ResolutionContext<'b> {
    /// Create a context. The core library and the root class exist from
    /// the start; registration binds a program's own root declaration to
    /// the same record if it declares one.
    pub fn new(config: ResolverConfig, backend: &'b dyn Backend) -> Self {
        let mut store = ClassStore::new();
        let core_library = LibraryId::new(0);
        let mut core = Library::new(core_library, config.core_library.clone());
        let root = store.alloc(
            config.root_class.clone(),
            core_library,
            ClassKind::Regular,
            Span::synthetic(),
        );
        core.scope.define(config.root_class.clone(), root);
        core.declared.push((config.root_class.clone(), root));

        Self {
            config,
            backend,
            store,
            libraries: vec![core],
            diagnostics: Diagnostics::new(),
            registry: FeatureLog::new(),
            deferred: Vec::new(),
            root,
            core_library,
        }
    }

    /// The root class.
    pub fn root(&self) -> ClassId {
        self.root
    }

    /// The core library.
    pub fn core_library(&self) -> LibraryId {
        self.core_library
    }

    /// The class store.
    pub fn store(&self) -> &ClassStore {
        &self.store
    }

    /// All libraries.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Borrow a library.
    pub fn library(&self, id: LibraryId) -> &Library {
        &self.libraries[id.index()]
    }

    pub(crate) fn library_mut(&mut self, id: LibraryId) -> &mut Library {
        &mut self.libraries[id.index()]
    }

    /// Find a library by name.
    pub fn find_library(&self, name: &str) -> Option<LibraryId> {
        self.libraries.iter().find(|l| l.name == name).map(|l| l.id)
    }

    /// Get or create a library by name.
    pub(crate) fn add_library(&mut self, name: &str) -> LibraryId {
        if let Some(id) = self.find_library(name) {
            return id;
        }
        let id = LibraryId::new(self.libraries.len() as u32);
        self.libraries.push(Library::new(id, name));
        id
    }

    /// Report a diagnostic.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    /// Resolve `name` (optionally `prefix.name`) in the given library,
    /// with the type parameters of `enclosing` in scope.
    pub fn lookup(
        &self,
        library: LibraryId,
        enclosing: Option<ClassId>,
        prefix: Option<&str>,
        name: &str,
    ) -> Result<Binding, LookupError> {
        let scope = &self.library(library).scope;

        if let Some(prefix) = prefix {
            let Some(target) = scope.lookup_prefix(prefix) else {
                return Err(LookupError::NotAPrefix { prefix: prefix.to_string() });
            };
            return match self.library(target).declaration(name) {
                Some(class) => Ok(Binding::Class(class)),
                None => Err(LookupError::NotFound),
            };
        }

        if let Some(enclosing) = enclosing {
            if let Some(param) = self.store.get(enclosing).type_param_named(name) {
                return Ok(Binding::TypeParam { owner: enclosing, index: param.index });
            }
        }

        if let Some(class) = scope.lookup(name) {
            return Ok(Binding::Class(class));
        }

        if scope.is_prefix(name) {
            return Err(LookupError::NotAType { name: name.to_string() });
        }

        Err(LookupError::NotFound)
    }

    /// Whether a library may extend/implement/mix in restricted platform
    /// types (the core library and backend target libraries may; they
    /// define them).
    pub fn is_exempt_library(&self, library: LibraryId) -> bool {
        library == self.core_library
            || self.backend.is_target_specific_library(&self.library(library).name)
    }

    /// Whether a class is one of the restricted platform types.
    pub fn is_restricted_platform_type(&self, class: ClassId) -> bool {
        let record = self.store.get(class);
        record.library == self.core_library
            && RESTRICTED_PLATFORM_TYPES.contains(&record.name.as_str())
    }

    /// Find a class by simple name across all libraries (first match in
    /// library order). Convenience for tests and tools.
    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.libraries
            .iter()
            .find_map(|l| l.declaration(name))
    }

    /// Find a class declared in a specific library.
    pub fn lookup_in(&self, library: &str, name: &str) -> Option<ClassId> {
        let id = self.find_library(library)?;
        self.library(id).declaration(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_starts_with_root() {
        let backend = DefaultBackend;
        let ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let root = ctx.root();
        assert_eq!(ctx.store().get(root).name, "Object");
        assert_eq!(ctx.store().get(root).library, ctx.core_library());
        assert_eq!(ctx.lookup_in("core", "Object"), Some(root));
    }

    #[test]
    fn restricted_platform_types_live_in_core() {
        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let core = ctx.core_library();
        let app = ctx.add_library("app");

        let int_core = ctx.store.alloc("int", core, ClassKind::Regular, Span::synthetic());
        let int_app = ctx.store.alloc("int", app, ClassKind::Regular, Span::synthetic());

        assert!(ctx.is_restricted_platform_type(int_core));
        assert!(!ctx.is_restricted_platform_type(int_app));
        assert!(ctx.is_exempt_library(core));
        assert!(!ctx.is_exempt_library(app));
    }

    #[test]
    fn lookup_walks_params_then_scope() {
        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let app = ctx.add_library("app");
        let class = ctx.store.alloc("Box", app, ClassKind::Regular, Span::synthetic());
        ctx.library_mut(app).scope.define("Box", class);
        ctx.library_mut(app).declared.push(("Box".to_string(), class));
        ctx.store.get_mut(class).type_params.push(crate::element::TypeParameter {
            name: "T".to_string(),
            owner: class,
            index: 0,
            bound: None,
            span: Span::synthetic(),
        });

        // Type parameter shadows nothing here but resolves first.
        assert_eq!(
            ctx.lookup(app, Some(class), None, "T"),
            Ok(Binding::TypeParam { owner: class, index: 0 })
        );
        assert_eq!(ctx.lookup(app, Some(class), None, "Box"), Ok(Binding::Class(class)));
        assert_eq!(ctx.lookup(app, None, None, "Missing"), Err(LookupError::NotFound));
    }

    #[test]
    fn prefixed_lookup() {
        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let app = ctx.add_library("app");
        let util = ctx.add_library("util");
        let helper = ctx.store.alloc("Helper", util, ClassKind::Regular, Span::synthetic());
        ctx.library_mut(util).declared.push(("Helper".to_string(), helper));
        ctx.library_mut(app).scope.define_prefix("u", util);

        assert_eq!(ctx.lookup(app, None, Some("u"), "Helper"), Ok(Binding::Class(helper)));
        assert_eq!(
            ctx.lookup(app, None, Some("x"), "Helper"),
            Err(LookupError::NotAPrefix { prefix: "x".to_string() })
        );
        assert_eq!(
            ctx.lookup(app, None, None, "u"),
            Err(LookupError::NotAType { name: "u".to_string() })
        );
    }
}

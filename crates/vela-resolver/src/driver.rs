//! The resolution driver.
//!
//! [`ResolutionPass`] orchestrates the whole computation over a parsed
//! [`Program`]:
//!
//! 1. **Registration**: allocate a class record per declaration, build
//!    library scopes and import prefixes, and materialize type-parameter
//!    shells and declared constructors.
//! 2. **Supertype loading**: bind every class's directly named
//!    supertypes (see the loader), breaking naming cycles.
//! 3. **Class resolution**: resolve each class in dependency order; a
//!    class is marked *started* before its resolver runs.
//! 4. **Deferred checks**: flush the append-only queue of
//!    type-variable bound-cycle checks.
//!
//! Everything is single-threaded and in-memory; the pass returns the
//! accumulated diagnostics and feature registrations.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};
use vela_ast::{Item, LibraryDecl, MemberDecl, Program};
use vela_core::{
    ClassId, Diagnostic, Diagnostics, FeatureLog, InternalError, MessageKind, ResolveResult,
};

use crate::context::{DeferredCheck, ResolutionContext};
use crate::element::{
    Capabilities, ClassKind, Constructor, ConstructorKind, ConstructorOrigin, ResolutionState,
    TypeParameter,
};
use crate::types::TypeVariable;

/// Result of a resolution run.
#[derive(Debug)]
pub struct ResolutionOutput {
    /// Diagnostics, in report order.
    pub diagnostics: Diagnostics,
    /// Feature registrations and constructor errors.
    pub features: FeatureLog,
}

impl ResolutionOutput {
    /// Whether resolution completed without diagnostics.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// The resolution pass. See the module docs for the phase breakdown.
pub struct ResolutionPass<'ast, 'c, 'b> {
    pub(crate) ctx: &'c mut ResolutionContext<'b>,
    pub(crate) decls: FxHashMap<ClassId, Item<'ast>>,
}

impl<'ast, 'c, 'b> ResolutionPass<'ast, 'c, 'b> {
    /// Run resolution over a program. This is the main entry point.
    pub fn run(
        ctx: &'c mut ResolutionContext<'b>,
        program: &Program<'ast>,
    ) -> ResolveResult<ResolutionOutput> {
        let mut pass = Self { ctx, decls: FxHashMap::default() };

        pass.register(program);

        let ids: Vec<ClassId> = pass.ctx.store.ids().collect();
        debug!(classes = ids.len(), "loading supertypes");
        for &id in &ids {
            pass.load_supertypes(id)?;
        }

        debug!("resolving classes");
        for &id in &ids {
            pass.ensure_resolved(id)?;
        }

        pass.flush_deferred_checks();

        Ok(ResolutionOutput {
            diagnostics: std::mem::take(&mut pass.ctx.diagnostics),
            features: std::mem::take(&mut pass.ctx.registry),
        })
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn register(&mut self, program: &Program<'ast>) {
        for library in program.libraries {
            self.register_library(library);
        }
        for library in program.libraries {
            self.register_imports(library);
        }
        // The core library's declarations are visible everywhere without
        // an explicit import, own declarations and explicit imports first.
        let core = self.ctx.core_library();
        let core_decls: Vec<(String, ClassId)> = self.ctx.library(core).declared.clone();
        let library_ids: Vec<_> = self.ctx.libraries.iter().map(|l| l.id).collect();
        for id in library_ids {
            if id == core {
                continue;
            }
            for (name, class) in &core_decls {
                if !name.starts_with('_') {
                    self.ctx.library_mut(id).scope.define(name.clone(), *class);
                }
            }
        }
    }

    fn register_library(&mut self, library: &LibraryDecl<'ast>) {
        let lid = self.ctx.add_library(library.name.name);

        for item in library.items {
            let name = item.name().name;
            let is_root_decl =
                lid == self.ctx.core_library() && name == self.ctx.config.root_class;

            let id = if is_root_decl {
                self.ctx.root()
            } else {
                let kind = match item {
                    Item::Class(_) => ClassKind::Regular,
                    Item::NamedMixin(_) => ClassKind::NamedMixinApplication,
                    Item::Enum(_) => ClassKind::Enum,
                };
                let id = self.ctx.store.alloc(name, lid, kind, item.span());
                self.ctx.library_mut(lid).scope.define(name, id);
                self.ctx.library_mut(lid).declared.push((name.to_string(), id));
                id
            };

            self.decls.insert(id, *item);
            self.register_item_details(id, item);
        }
    }

    fn register_item_details(&mut self, id: ClassId, item: &Item<'ast>) {
        let (is_abstract, type_params) = match item {
            Item::Class(decl) => (decl.is_abstract, decl.type_params),
            Item::NamedMixin(decl) => (decl.is_abstract, decl.type_params),
            Item::Enum(_) => (false, &[][..]),
        };

        let record = self.ctx.store.get_mut(id);
        record.is_abstract = is_abstract;
        record.span = item.span();
        for (index, node) in type_params.iter().enumerate() {
            record.type_params.push(TypeParameter {
                name: node.name.name.to_string(),
                owner: id,
                index: index as u16,
                bound: None,
                span: node.name.span,
            });
        }

        if let Item::Class(decl) = item {
            for member in decl.members {
                match member {
                    MemberDecl::Constructor(ctor) => {
                        let mut required = Vec::new();
                        let mut optional = Vec::new();
                        let mut named = Vec::new();
                        for param in ctor.params {
                            let name = param.name.name.to_string();
                            match param.kind {
                                vela_ast::ParamKind::Required => required.push(name),
                                vela_ast::ParamKind::OptionalPositional => optional.push(name),
                                vela_ast::ParamKind::Named => named.push(name),
                            }
                        }
                        let record = self.ctx.store.get_mut(id);
                        record.constructors.push(Constructor {
                            name: ctor.name.map(|n| n.name.to_string()).unwrap_or_default(),
                            kind: if ctor.is_factory {
                                ConstructorKind::Factory
                            } else {
                                ConstructorKind::Generative
                            },
                            required,
                            optional,
                            named,
                            origin: ConstructorOrigin::Declared,
                            span: ctor.span,
                        });
                        record.capabilities |= Capabilities::HAS_OWN_CONSTRUCTORS;
                    }
                    MemberDecl::Other(other) => {
                        self.ctx.store.get_mut(id).members.push(other.name.name.to_string());
                    }
                }
            }
        }
    }

    fn register_imports(&mut self, library: &LibraryDecl<'ast>) {
        let Some(lid) = self.ctx.find_library(library.name.name) else {
            return;
        };
        for import in library.imports {
            let Some(target) = self.ctx.find_library(import.library.name) else {
                continue;
            };
            match import.prefix {
                Some(prefix) => {
                    self.ctx.library_mut(lid).scope.define_prefix(prefix.name, target);
                }
                None => {
                    let exported: Vec<(String, ClassId)> = self
                        .ctx
                        .library(target)
                        .declared
                        .iter()
                        .filter(|(name, _)| !name.starts_with('_'))
                        .cloned()
                        .collect();
                    for (name, class) in exported {
                        self.ctx.library_mut(lid).scope.define(name, class);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Resolve a class unless it is already done or currently resolving.
    ///
    /// Observing the *started* state here means a hierarchy cycle the
    /// loader has already reported; the caller tolerates the truncation.
    pub(crate) fn ensure_resolved(&mut self, id: ClassId) -> ResolveResult<()> {
        match self.ctx.store.try_get(id)?.resolution_state {
            ResolutionState::Done | ResolutionState::Started => Ok(()),
            ResolutionState::Unstarted => {
                trace!(class = %self.ctx.store.get(id).name, "resolving");
                self.ctx.store.get_mut(id).resolution_state = ResolutionState::Started;
                self.resolve_class(id)
            }
        }
    }

    pub(crate) fn check_started(&self, id: ClassId) -> ResolveResult<()> {
        if self.ctx.store.try_get(id)?.resolution_state != ResolutionState::Started {
            return Err(InternalError::NotStarted(id));
        }
        Ok(())
    }

    // =========================================================================
    // Deferred checks
    // =========================================================================

    /// Flush the bound-cycle queue.
    ///
    /// All checks for one class share a visited set: a walk reaching its
    /// own starting variable reports `cyclic-type-variable`; a walk
    /// reaching any variable an earlier walk already visited stops
    /// silently. Each cycle is therefore reported exactly once, on its
    /// starting member.
    fn flush_deferred_checks(&mut self) {
        let checks = std::mem::take(&mut self.ctx.deferred);
        let mut seen_by_class: FxHashMap<ClassId, FxHashSet<TypeVariable>> =
            FxHashMap::default();

        for check in checks {
            let DeferredCheck::BoundCycle { class, index } = check;
            let start = TypeVariable { owner: class, index };
            let mut report = None;
            {
                let seen = seen_by_class.entry(class).or_default();
                seen.insert(start);
                let mut current = self.bound_as_variable(start);
                while let Some(variable) = current {
                    if variable == start {
                        let param = &self.ctx.store.get(class).type_params[index as usize];
                        report = Some(
                            Diagnostic::new(MessageKind::CyclicTypeVariable, param.span)
                                .with_arg("name", param.name.clone()),
                        );
                        break;
                    }
                    if !seen.insert(variable) {
                        break;
                    }
                    current = self.bound_as_variable(variable);
                }
            }
            if let Some(diagnostic) = report {
                debug!(class = %self.ctx.store.get(class).name, "type-variable bound cycle");
                self.ctx.report(diagnostic);
            }
        }
    }

    /// The bound of a type variable, if that bound is itself a variable.
    fn bound_as_variable(&self, variable: TypeVariable) -> Option<TypeVariable> {
        let bound = self
            .ctx
            .store
            .get(variable.owner)
            .type_params
            .get(variable.index as usize)?
            .bound
            .as_ref()?
            .as_variable()?;
        Some(bound)
    }
}

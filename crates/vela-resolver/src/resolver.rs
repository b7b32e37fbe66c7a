//! The class resolver.
//!
//! Resolves one class at a time, assumed to be in the *started* state:
//! type-parameter bounds, the supertype (with mixin expansion when a
//! `with` clause is present), the interface list, default-constructor
//! synthesis, and finally the linearized supertype set. Every invalid
//! construct is replaced by a documented fallback so resolution of the
//! class, and of every other class, always completes.

use rustc_hash::FxHashSet;
use vela_ast::{ClassDecl, EnumDecl, Item, NamedMixinDecl, SuperclassClause, TypeAnnotation, TypeParamNode};
use vela_core::{ClassId, Diagnostic, Feature, MessageKind, ResolveResult, Span};

use crate::context::DeferredCheck;
use crate::driver::ResolutionPass;
use crate::element::{
    Capabilities, ClassKind, Constructor, ConstructorKind, ConstructorOrigin, ConstructorRef,
    ResolutionState,
};
use crate::linearize::SupertypeSetBuilder;
use crate::type_resolver::TypeExprResolver;
use crate::types::ResolvedType;

impl<'ast, 'c, 'b> ResolutionPass<'ast, 'c, 'b> {
    /// Resolve one class. The driver has already transitioned it to
    /// *started*; anything else is a driver bug.
    pub(crate) fn resolve_class(&mut self, id: ClassId) -> ResolveResult<()> {
        self.check_started(id)?;

        match self.decls.get(&id).copied() {
            // Only the implicit root has no declaration; synthetic mixin
            // applications are resolved at creation and never get here.
            None => self.resolve_implicit_root(id)?,
            Some(Item::Class(decl)) => self.resolve_regular_class(id, &decl)?,
            Some(Item::NamedMixin(decl)) => self.resolve_named_mixin(id, &decl)?,
            Some(Item::Enum(decl)) => self.resolve_enum(id, &decl)?,
        }

        self.ctx.store.get_mut(id).resolution_state = ResolutionState::Done;
        Ok(())
    }

    fn resolve_implicit_root(&mut self, id: ClassId) -> ResolveResult<()> {
        self.ctx.store.get_mut(id).set_interfaces(Vec::new())?;
        self.synthesize_default_constructor(id);
        self.finish_linearization(id)
    }

    fn resolve_regular_class(&mut self, id: ClassId, decl: &ClassDecl<'ast>) -> ResolveResult<()> {
        self.resolve_type_parameters(id, decl.type_params);

        let root = self.ctx.root();
        if self.ctx.store.get(id).supertype().is_none() && id != root {
            match &decl.superclass {
                SuperclassClause::None => {
                    let target = self
                        .ctx
                        .backend
                        .default_superclass(self.ctx.store.get(id), root);
                    if target != id {
                        let arity = self.ctx.store.get(target).type_params.len();
                        self.ctx
                            .store
                            .get_mut(id)
                            .set_supertype(ResolvedType::raw(target, arity))?;
                    }
                }
                SuperclassClause::Extends(annotation) => {
                    let library = self.ctx.store.get(id).library;
                    let resolved =
                        TypeExprResolver::new(self.ctx, library, Some(id)).resolve(annotation);
                    let validated = self.validate_supertype(id, resolved, annotation.span);
                    self.ctx.store.get_mut(id).set_supertype(validated)?;
                }
                SuperclassClause::With(clause) => {
                    let (supertype, _) =
                        self.expand_mixin_chain(id, &clause.base, clause.mixins, false)?;
                    self.ctx.store.get_mut(id).set_supertype(supertype)?;
                }
            }
        }

        let interfaces = self.resolve_interfaces(id, decl.interfaces, Vec::new());
        self.ctx.store.get_mut(id).set_interfaces(interfaces)?;

        self.ensure_direct_neighbors_resolved(id)?;
        self.synthesize_default_constructor(id);
        self.finish_linearization(id)
    }

    fn resolve_named_mixin(&mut self, id: ClassId, decl: &NamedMixinDecl<'ast>) -> ResolveResult<()> {
        self.resolve_type_parameters(id, decl.type_params);

        let mut initial = Vec::new();
        if self.ctx.store.get(id).supertype().is_none() {
            let (supertype, mixin) =
                self.expand_mixin_chain(id, &decl.clause.base, decl.clause.mixins, true)?;
            self.ctx.store.get_mut(id).set_supertype(supertype)?;
            if let Some(mixin) = mixin {
                initial.push(mixin.clone());
                let record = self.ctx.store.get_mut(id);
                record.mixin = Some(mixin);
                record.capabilities |= Capabilities::HAS_MIXIN;
            }
        }

        let interfaces = self.resolve_interfaces(id, decl.interfaces, initial);
        self.ctx.store.get_mut(id).set_interfaces(interfaces)?;

        self.ensure_direct_neighbors_resolved(id)?;
        self.synthesize_forwarding_constructors(id)?;
        self.check_mixin_cycle(id);
        self.finish_linearization(id)
    }

    fn resolve_enum(&mut self, id: ClassId, decl: &EnumDecl<'ast>) -> ResolveResult<()> {
        if decl.values.is_empty() {
            let name = self.ctx.store.get(id).name.clone();
            self.ctx.report(
                Diagnostic::new(MessageKind::EmptyEnumDeclaration, decl.span)
                    .with_arg("name", name),
            );
        }

        let root = self.ctx.root();
        if self.ctx.store.get(id).supertype().is_none() {
            let arity = self.ctx.store.get(root).type_params.len();
            self.ctx.store.get_mut(id).set_supertype(ResolvedType::raw(root, arity))?;
        }
        self.ctx.store.get_mut(id).set_interfaces(Vec::new())?;

        self.ensure_direct_neighbors_resolved(id)?;
        // Enum value members are materialized by a later phase; no
        // constructor synthesis here.
        self.finish_linearization(id)
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    fn resolve_type_parameters(&mut self, id: ClassId, nodes: &[TypeParamNode<'ast>]) {
        for (index, node) in nodes.iter().enumerate() {
            if nodes[..index].iter().any(|p| p.name.name == node.name.name) {
                self.ctx.report(
                    Diagnostic::new(MessageKind::DuplicateTypeVariableName, node.name.span)
                        .with_arg("name", node.name.name),
                );
            }
        }

        let library = self.ctx.store.get(id).library;
        for (index, node) in nodes.iter().enumerate() {
            let bound = match &node.bound {
                Some(annotation) => {
                    let bound =
                        TypeExprResolver::new(self.ctx, library, Some(id)).resolve(annotation);
                    self.ctx
                        .deferred
                        .push(DeferredCheck::BoundCycle { class: id, index: index as u16 });
                    bound
                }
                None => ResolvedType::Dynamic,
            };
            self.ctx.store.get_mut(id).type_params[index].bound = Some(bound);
        }
    }

    // =========================================================================
    // Supertype and interface validation
    // =========================================================================

    /// Validate a resolved type in extends position; on any error the
    /// root class stands in.
    pub(crate) fn validate_supertype(
        &mut self,
        id: ClassId,
        resolved: ResolvedType,
        span: Span,
    ) -> ResolvedType {
        let root = self.ctx.root();
        let root_arity = self.ctx.store.get(root).type_params.len();
        let class_name = self.ctx.store.get(id).name.clone();

        match resolved {
            ResolvedType::Malformed(_) => {
                self.ctx.report(
                    Diagnostic::new(MessageKind::CannotExtendMalformed, span)
                        .with_arg("class", class_name),
                );
            }
            ResolvedType::Dynamic => {
                self.report_restricted(id, MessageKind::CannotExtend, "dynamic", span);
            }
            ResolvedType::Variable(_) => {
                self.ctx
                    .report(Diagnostic::new(MessageKind::ClassNameExpected, span));
            }
            ResolvedType::Instance(instance) => {
                let target = self.ctx.store.get(instance.class);
                if target.kind == ClassKind::Enum {
                    let name = target.name.clone();
                    self.ctx.report(
                        Diagnostic::new(MessageKind::CannotExtendEnum, span)
                            .with_arg("type", name),
                    );
                } else if self.is_restricted_for(id, instance.class) {
                    let name = target.name.clone();
                    self.ctx.report(
                        Diagnostic::new(MessageKind::CannotExtend, span).with_arg("type", name),
                    );
                } else {
                    return ResolvedType::Instance(instance);
                }
            }
        }
        ResolvedType::raw(root, root_arity)
    }

    /// Validate a resolved type in implements position; invalid entries
    /// are dropped from the list.
    fn validate_interface(
        &mut self,
        id: ClassId,
        resolved: ResolvedType,
        span: Span,
    ) -> Option<ResolvedType> {
        let class_name = self.ctx.store.get(id).name.clone();
        match resolved {
            ResolvedType::Malformed(_) => {
                self.ctx.report(
                    Diagnostic::new(MessageKind::CannotImplementMalformed, span)
                        .with_arg("class", class_name),
                );
                None
            }
            ResolvedType::Dynamic => {
                self.report_restricted(id, MessageKind::CannotImplement, "dynamic", span);
                None
            }
            ResolvedType::Variable(_) => {
                self.ctx
                    .report(Diagnostic::new(MessageKind::ClassNameExpected, span));
                None
            }
            ResolvedType::Instance(instance) => {
                let target = self.ctx.store.get(instance.class);
                if target.kind == ClassKind::Enum {
                    let name = target.name.clone();
                    self.ctx.report(
                        Diagnostic::new(MessageKind::CannotImplementEnum, span)
                            .with_arg("type", name),
                    );
                    None
                } else if self.is_restricted_for(id, instance.class) {
                    let name = target.name.clone();
                    self.ctx.report(
                        Diagnostic::new(MessageKind::CannotImplement, span)
                            .with_arg("type", name),
                    );
                    None
                } else {
                    Some(ResolvedType::Instance(instance))
                }
            }
        }
    }

    /// Resolve and validate an implements clause. `initial` seeds the
    /// list (the mixin type of a named mixin application comes first).
    fn resolve_interfaces(
        &mut self,
        id: ClassId,
        annotations: &[TypeAnnotation<'ast>],
        initial: Vec<ResolvedType>,
    ) -> Vec<ResolvedType> {
        let library = self.ctx.store.get(id).library;
        let supertype_class =
            self.ctx.store.get(id).supertype().and_then(|t| t.class_id());

        let mut result = initial;
        let mut seen: FxHashSet<ClassId> =
            result.iter().filter_map(|t| t.class_id()).collect();

        for annotation in annotations {
            let resolved =
                TypeExprResolver::new(self.ctx, library, Some(id)).resolve(annotation);
            let Some(valid) = self.validate_interface(id, resolved, annotation.span) else {
                continue;
            };
            let Some(class) = valid.class_id() else {
                continue;
            };
            let type_name = self.ctx.store.get(class).name.clone();
            if supertype_class == Some(class) {
                self.ctx.report(
                    Diagnostic::new(MessageKind::DuplicateExtendsImplements, annotation.span)
                        .with_arg("type", type_name.clone()),
                );
            }
            if seen.insert(class) {
                result.push(valid);
            } else {
                self.ctx.report(
                    Diagnostic::new(MessageKind::DuplicateImplements, annotation.span)
                        .with_arg("type", type_name),
                );
            }
        }
        result
    }

    /// Whether `target` is a restricted platform type from the
    /// perspective of `id`'s library.
    fn is_restricted_for(&self, id: ClassId, target: ClassId) -> bool {
        self.ctx.is_restricted_platform_type(target)
            && !self.ctx.is_exempt_library(self.ctx.store.get(id).library)
    }

    /// Report misuse of a restricted type, downgrading to
    /// `class-name-expected` inside exempt libraries (where the
    /// restriction does not apply but the construct is still not an
    /// interface type).
    fn report_restricted(&mut self, id: ClassId, kind: MessageKind, type_name: &str, span: Span) {
        let library = self.ctx.store.get(id).library;
        if self.ctx.is_exempt_library(library) {
            self.ctx
                .report(Diagnostic::new(MessageKind::ClassNameExpected, span));
        } else {
            self.ctx
                .report(Diagnostic::new(kind, span).with_arg("type", type_name));
        }
    }

    // =========================================================================
    // Constructor synthesis
    // =========================================================================

    /// Synthesize the default constructor for a class that declares
    /// none. Mixin applications get forwarders instead; enums get their
    /// members from a later phase.
    fn synthesize_default_constructor(&mut self, id: ClassId) {
        let (kind, has_constructors, supertype_class, span) = {
            let record = self.ctx.store.get(id);
            (
                record.kind,
                !record.constructors.is_empty(),
                record.supertype().and_then(|t| t.class_id()),
                record.span,
            )
        };
        if has_constructors || kind == ClassKind::Enum || kind.is_mixin_application() {
            return;
        }

        let Some(superclass) = supertype_class else {
            // The root class: a plain default constructor with nothing to
            // forward to.
            self.ctx.store.get_mut(id).constructors.push(Constructor {
                name: String::new(),
                kind: ConstructorKind::Generative,
                required: Vec::new(),
                optional: Vec::new(),
                named: Vec::new(),
                origin: ConstructorOrigin::SynthesizedDefault { target: None },
                span: Span::synthetic(),
            });
            return;
        };

        let class_name = self.ctx.store.get(id).name.clone();
        let super_name = self.ctx.store.get(superclass).name.clone();
        let target = self.ctx.store.get(superclass).find_constructor("").map(
            |(index, ctor)| (index, ctor.kind, ctor.requires_arguments()),
        );

        match target {
            None => {
                self.install_erroneous_constructor(
                    id,
                    Diagnostic::new(MessageKind::CannotFindUnnamedConstructor, span)
                        .with_arg("class", class_name)
                        .with_arg("superclass", super_name),
                );
            }
            Some((_, ConstructorKind::Factory, _)) => {
                self.install_erroneous_constructor(
                    id,
                    Diagnostic::new(MessageKind::SuperCallToFactory, span)
                        .with_arg("class", class_name)
                        .with_arg("superclass", super_name),
                );
            }
            Some((_, ConstructorKind::Generative, true)) => {
                self.install_erroneous_constructor(
                    id,
                    Diagnostic::new(MessageKind::NoMatchingConstructorForImplicit, span)
                        .with_arg("class", class_name)
                        .with_arg("superclass", super_name),
                );
            }
            Some((index, ConstructorKind::Generative, false)) => {
                self.ctx.store.get_mut(id).constructors.push(Constructor {
                    name: String::new(),
                    kind: ConstructorKind::Generative,
                    required: Vec::new(),
                    optional: Vec::new(),
                    named: Vec::new(),
                    origin: ConstructorOrigin::SynthesizedDefault {
                        target: Some(ConstructorRef { class: superclass, index }),
                    },
                    span: Span::synthetic(),
                });
            }
        }
    }

    /// Install the erroneous placeholder: report, attach the error to
    /// the constructor through the registry, and register the
    /// no-such-method feature (invoking the placeholder throws).
    fn install_erroneous_constructor(&mut self, id: ClassId, diagnostic: Diagnostic) {
        self.ctx.report(diagnostic.clone());
        self.ctx.registry.register_constructor_error(id, diagnostic);
        self.ctx.registry.register_feature(Feature::ThrowNoSuchMethod);
        self.ctx.store.get_mut(id).constructors.push(Constructor {
            name: String::new(),
            kind: ConstructorKind::Generative,
            required: Vec::new(),
            optional: Vec::new(),
            named: Vec::new(),
            origin: ConstructorOrigin::Erroneous,
            span: Span::synthetic(),
        });
    }

    // =========================================================================
    // Linearization
    // =========================================================================

    /// Resolve every class the supertype/interface lists reference, so
    /// their linearizations exist before ours is computed. A neighbor
    /// still in the *started* state is a cycle the loader reported; it is
    /// tolerated and surfaces as an incomplete hierarchy.
    pub(crate) fn ensure_direct_neighbors_resolved(&mut self, id: ClassId) -> ResolveResult<()> {
        let neighbors: Vec<ClassId> = {
            let record = self.ctx.store.get(id);
            record
                .supertype()
                .into_iter()
                .chain(record.interfaces().iter())
                .chain(record.mixin.iter())
                .filter_map(|t| t.class_id())
                .collect()
        };
        for neighbor in neighbors {
            self.ensure_resolved(neighbor)?;
        }
        Ok(())
    }

    /// Compute and store the linearized supertype set.
    pub(crate) fn finish_linearization(&mut self, id: ClassId) -> ResolveResult<()> {
        let root = self.ctx.root();
        let (this_type, supertype, interfaces, mixin_class) = {
            let record = self.ctx.store.get(id);
            (
                record.this_type(),
                record.supertype().cloned(),
                record.interfaces().to_vec(),
                record.mixin.as_ref().and_then(|t| t.class_id()),
            )
        };

        let mut incomplete = false;
        let mut builder = SupertypeSetBuilder::new(this_type, root);

        if let Some(supertype) = &supertype {
            builder.add(supertype);
        }
        for interface in &interfaces {
            builder.add(interface);
        }

        for direct in supertype.iter().chain(interfaces.iter()) {
            let Some(instance) = direct.as_instance() else {
                continue;
            };
            let record = self.ctx.store.get(instance.class);
            if record.has_incomplete_hierarchy {
                incomplete = true;
            }
            match record.all_supertypes() {
                Some(set) => {
                    for entry in set.supertypes() {
                        builder.add(&entry.substitute(instance.class, &instance.args));
                    }
                }
                // The neighbor is mid-resolution: a reported cycle.
                None => incomplete = true,
            }
        }

        if let Some(mixin_class) = mixin_class {
            if self.ctx.store.get(mixin_class).has_incomplete_hierarchy {
                incomplete = true;
            }
        }

        let root_arity = self.ctx.store.get(root).type_params.len();
        let set = builder.finish(ResolvedType::raw(root, root_arity));

        let record = self.ctx.store.get_mut(id);
        if incomplete {
            record.has_incomplete_hierarchy = true;
        }
        record.set_all_supertypes(set)
    }
}

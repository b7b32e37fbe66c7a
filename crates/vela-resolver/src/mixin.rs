//! Mixin-application expansion.
//!
//! A clause `S with M1, …, Mk` compiles into a linear chain of synthetic
//! intermediate classes `S → _S&M1 → _S&M1&M2 → … → _S&M1&…&Mk`; the
//! declaring class extends the last link. Each intermediate's supertype
//! is the previous link, its mixin type is the corresponding `Mi`, its
//! interface list starts with `Mi`, and its constructors forward to the
//! accessible generative constructors of its superclass.
//!
//! Two interning strategies exist (see
//! [`MixinSharing`](crate::context::MixinSharing)): per-application
//! intermediates whose type parameters mirror the enclosing class, or
//! per-library sharing keyed by a structural signature over the free
//! type variables of the supertype and mixin arguments. Both produce
//! hierarchies with identical observable semantics.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use vela_ast::TypeAnnotation;
use vela_core::{ClassId, Diagnostic, LibraryId, MessageKind, ResolveResult, Span};

use crate::context::MixinSharing;
use crate::driver::ResolutionPass;
use crate::element::{
    Capabilities, ClassKind, ClassStore, Constructor, ConstructorKind, ConstructorOrigin,
    ConstructorRef, LoadState, ResolutionState, TypeParameter,
};
use crate::type_resolver::TypeExprResolver;
use crate::types::{InstanceType, ResolvedType};

/// Cumulative structural signature of one clause expansion, used as the
/// interning key under the sharing strategy.
///
/// Enclosing-class type parameters map to `#Ti`; raw generics get one
/// fresh `#Uj` per distinct raw class name; every other argument gets
/// its own fresh `#Uj`. Argument lists are introduced by `^` and
/// separated by `&` internally.
struct MixinSignature {
    enclosing: ClassId,
    signature: String,
    next_fresh: u32,
    raw_tokens: FxHashMap<String, String>,
    /// Distinct placeholders with the actual type of their first
    /// occurrence, in first-occurrence order.
    free_vars: Vec<(String, ResolvedType)>,
    index_of: FxHashMap<String, u16>,
}

impl MixinSignature {
    fn new(enclosing: ClassId) -> Self {
        Self {
            enclosing,
            signature: String::new(),
            next_fresh: 0,
            raw_tokens: FxHashMap::default(),
            free_vars: Vec::new(),
            index_of: FxHashMap::default(),
        }
    }

    /// Append the signature part for one argument list; returns the
    /// placeholder index of each argument position.
    fn append_list(&mut self, args: &[ResolvedType], store: &ClassStore) -> Vec<u16> {
        if args.is_empty() {
            return Vec::new();
        }
        self.signature.push('^');
        let mut positions = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.signature.push('&');
            }
            let token = self.token_for(arg, store);
            self.signature.push_str(&token);
            positions.push(self.index_of[&token]);
        }
        positions
    }

    fn token_for(&mut self, arg: &ResolvedType, store: &ClassStore) -> String {
        let token = match arg.as_variable() {
            Some(variable) if variable.owner == self.enclosing => {
                format!("#T{}", variable.index)
            }
            _ => match raw_generic_name(arg, store) {
                Some(raw) => match self.raw_tokens.get(&raw) {
                    Some(token) => token.clone(),
                    None => {
                        let token = self.fresh();
                        self.raw_tokens.insert(raw, token.clone());
                        token
                    }
                },
                None => self.fresh(),
            },
        };
        if !self.index_of.contains_key(&token) {
            self.index_of.insert(token.clone(), self.free_vars.len() as u16);
            self.free_vars.push((token.clone(), arg.clone()));
        }
        token
    }

    fn fresh(&mut self) -> String {
        let token = format!("#U{}", self.next_fresh);
        self.next_fresh += 1;
        token
    }
}

/// The class name of a raw generic instantiation (a generic class used
/// with all-dynamic arguments).
fn raw_generic_name(arg: &ResolvedType, store: &ClassStore) -> Option<String> {
    let instance = arg.as_instance()?;
    if instance.args.is_empty() {
        return None;
    }
    if instance.args.iter().all(|a| matches!(a, ResolvedType::Dynamic)) {
        Some(store.get(instance.class).name.clone())
    } else {
        None
    }
}

impl<'ast, 'c, 'b> ResolutionPass<'ast, 'c, 'b> {
    /// Expand `base with mixins…` for the class `id`.
    ///
    /// Returns the type `id` extends (the last chain link) and, for a
    /// named application, the mixin type of `id` itself (the last `Mi`).
    /// An invalid mixin reports, flags `id` incomplete, and truncates
    /// the chain at the last valid link.
    pub(crate) fn expand_mixin_chain(
        &mut self,
        id: ClassId,
        base: &TypeAnnotation<'ast>,
        mixins: &[TypeAnnotation<'ast>],
        named: bool,
    ) -> ResolveResult<(ResolvedType, Option<ResolvedType>)> {
        let library = self.ctx.store.get(id).library;

        let resolved = TypeExprResolver::new(self.ctx, library, Some(id)).resolve(base);
        let mut current = self.validate_supertype(id, resolved, base.span);
        if let Some(class) = current.class_id() {
            self.ensure_resolved(class)?;
        }
        if mixins.is_empty() {
            return Ok((current, None));
        }

        let mut interner = match self.ctx.config.mixin_sharing {
            MixinSharing::SharedPerLibrary => {
                let mut signature = MixinSignature::new(id);
                let positions = match current.as_instance() {
                    Some(instance) => signature.append_list(&instance.args, &self.ctx.store),
                    None => Vec::new(),
                };
                Some((signature, positions))
            }
            MixinSharing::PerApplication => None,
        };

        let mut named_mixin = None;
        let last = mixins.len() - 1;
        for (i, annotation) in mixins.iter().enumerate() {
            let resolved =
                TypeExprResolver::new(self.ctx, library, Some(id)).resolve(annotation);
            let Some(mixin) = self.validate_mixin(id, resolved, annotation.span) else {
                self.ctx.store.get_mut(id).has_incomplete_hierarchy = true;
                return Ok((current, named_mixin));
            };
            self.ensure_resolved(mixin.class)?;
            if named && i == last {
                named_mixin = Some(ResolvedType::Instance(mixin.clone()));
            }
            current = match &mut interner {
                Some((signature, positions)) => {
                    self.shared_application(library, &current, &mixin, signature, positions)?
                }
                None => self.fresh_application(id, library, &current, &mixin)?,
            };
        }

        Ok((current, named_mixin))
    }

    /// Validate a resolved type in mixin position.
    fn validate_mixin(
        &mut self,
        id: ClassId,
        resolved: ResolvedType,
        span: Span,
    ) -> Option<InstanceType> {
        let class_name = self.ctx.store.get(id).name.clone();
        match resolved {
            ResolvedType::Malformed(_) => {
                self.ctx.report(
                    Diagnostic::new(MessageKind::CannotMixinMalformed, span)
                        .with_arg("class", class_name),
                );
                None
            }
            ResolvedType::Dynamic => {
                self.report_restricted_mixin(id, "dynamic", span);
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
                        Diagnostic::new(MessageKind::CannotMixinEnum, span)
                            .with_arg("type", name),
                    );
                    None
                } else if self.ctx.is_restricted_platform_type(instance.class)
                    && !self.ctx.is_exempt_library(self.ctx.store.get(id).library)
                {
                    let name = target.name.clone();
                    self.ctx.report(
                        Diagnostic::new(MessageKind::CannotMixin, span).with_arg("type", name),
                    );
                    None
                } else {
                    Some(instance)
                }
            }
        }
    }

    fn report_restricted_mixin(&mut self, id: ClassId, type_name: &str, span: Span) {
        let library = self.ctx.store.get(id).library;
        if self.ctx.is_exempt_library(library) {
            self.ctx
                .report(Diagnostic::new(MessageKind::ClassNameExpected, span));
        } else {
            self.ctx.report(
                Diagnostic::new(MessageKind::CannotMixin, span).with_arg("type", type_name),
            );
        }
    }

    /// Chain-link name: `_S&M`, extending the previous link's name.
    fn application_name(&self, current: &ResolvedType, mixin: &InstanceType) -> String {
        let super_name = current
            .class_id()
            .map(|c| self.ctx.store.get(c).name.clone())
            .unwrap_or_else(|| "dynamic".to_string());
        let mixin_name = &self.ctx.store.get(mixin.class).name;
        format!("_{}&{}", super_name.trim_start_matches('_'), mixin_name)
    }

    // =========================================================================
    // Per-application strategy
    // =========================================================================

    /// Create an intermediate unique to this application. Its type
    /// parameters mirror the enclosing class's under fresh identities;
    /// supertype and mixin are substituted accordingly.
    fn fresh_application(
        &mut self,
        enclosing: ClassId,
        library: LibraryId,
        current: &ResolvedType,
        mixin: &InstanceType,
    ) -> ResolveResult<ResolvedType> {
        let name = self.application_name(current, mixin);
        let id = self
            .ctx
            .store
            .alloc(name, library, ClassKind::SyntheticMixinApplication, Span::synthetic());
        debug!(class = %self.ctx.store.get(id).name, "synthesized mixin application");

        let params: Vec<(String, Span, Option<ResolvedType>)> = self
            .ctx
            .store
            .get(enclosing)
            .type_params
            .iter()
            .map(|p| (p.name.clone(), p.span, p.bound.clone()))
            .collect();
        let arity = params.len();
        let fresh_args: Vec<ResolvedType> =
            (0..arity).map(|i| ResolvedType::variable(id, i as u16)).collect();

        {
            let record = self.ctx.store.get_mut(id);
            record.capabilities |= Capabilities::IS_SYNTHETIC;
            for (index, (name, span, _)) in params.iter().enumerate() {
                record.type_params.push(TypeParameter {
                    name: name.clone(),
                    owner: id,
                    index: index as u16,
                    bound: None,
                    span: *span,
                });
            }
        }
        for (index, (_, _, bound)) in params.iter().enumerate() {
            let bound = bound
                .clone()
                .unwrap_or(ResolvedType::Dynamic)
                .substitute(enclosing, &fresh_args);
            self.ctx.store.get_mut(id).type_params[index].bound = Some(bound);
        }

        let supertype = current.substitute(enclosing, &fresh_args);
        let mixin_type = ResolvedType::Instance(mixin.clone()).substitute(enclosing, &fresh_args);
        self.complete_application(id, supertype, mixin_type)?;

        let args = (0..arity)
            .map(|i| ResolvedType::variable(enclosing, i as u16))
            .collect();
        Ok(ResolvedType::instance(id, args))
    }

    // =========================================================================
    // Sharing strategy
    // =========================================================================

    /// Intern or create an intermediate shared per library. The key is
    /// the chain-link name plus the cumulative structural signature;
    /// `positions` tracks the placeholder index of each of `current`'s
    /// argument positions and is updated for the next link.
    fn shared_application(
        &mut self,
        library: LibraryId,
        current: &ResolvedType,
        mixin: &InstanceType,
        signature: &mut MixinSignature,
        positions: &mut Vec<u16>,
    ) -> ResolveResult<ResolvedType> {
        let mixin_positions = signature.append_list(&mixin.args, &self.ctx.store);
        let name = self.application_name(current, mixin);
        let key = format!("{}{}", name, signature.signature);
        let actual_args: Vec<ResolvedType> =
            signature.free_vars.iter().map(|(_, actual)| actual.clone()).collect();
        let arity = actual_args.len();

        if let Some(&existing) = self.ctx.library(library).mixin_applications.get(&key) {
            *positions = (0..arity as u16).collect();
            return Ok(ResolvedType::instance(existing, actual_args));
        }

        let id = self
            .ctx
            .store
            .alloc(name, library, ClassKind::SyntheticMixinApplication, Span::synthetic());
        debug!(class = %self.ctx.store.get(id).name, key = %key, "interned mixin application");
        {
            let record = self.ctx.store.get_mut(id);
            record.capabilities |= Capabilities::IS_SYNTHETIC;
            for (index, (placeholder, _)) in signature.free_vars.iter().enumerate() {
                record.type_params.push(TypeParameter {
                    name: placeholder.clone(),
                    owner: id,
                    index: index as u16,
                    bound: Some(ResolvedType::Dynamic),
                    span: Span::synthetic(),
                });
            }
        }

        let canon_super = match current.as_instance() {
            Some(instance) => ResolvedType::instance(
                instance.class,
                positions.iter().map(|&p| ResolvedType::variable(id, p)).collect(),
            ),
            // Validated supertypes are always instances; kept total for
            // the malformed fallback.
            None => current.clone(),
        };
        let canon_mixin = ResolvedType::instance(
            mixin.class,
            mixin_positions.iter().map(|&p| ResolvedType::variable(id, p)).collect(),
        );

        self.ctx.library_mut(library).mixin_applications.insert(key, id);
        self.complete_application(id, canon_super, canon_mixin)?;

        *positions = (0..arity as u16).collect();
        Ok(ResolvedType::instance(id, actual_args))
    }

    // =========================================================================
    // Common completion
    // =========================================================================

    /// Fill in a freshly created intermediate: supertype, mixin type,
    /// interface list, forwarders, cycle check, linearization.
    fn complete_application(
        &mut self,
        id: ClassId,
        supertype: ResolvedType,
        mixin_type: ResolvedType,
    ) -> ResolveResult<()> {
        {
            let record = self.ctx.store.get_mut(id);
            record.load_state = LoadState::Done;
            record.resolution_state = ResolutionState::Started;
            record.set_supertype(supertype)?;
            record.mixin = Some(mixin_type.clone());
            record.set_interfaces(vec![mixin_type])?;
            record.capabilities |= Capabilities::HAS_MIXIN;
        }
        self.synthesize_forwarding_constructors(id)?;
        self.check_mixin_cycle(id);
        self.finish_linearization(id)?;
        self.ctx.store.get_mut(id).resolution_state = ResolutionState::Done;
        Ok(())
    }

    /// Replace a mixin application's constructors with forwarders: one
    /// per generative constructor of the superclass, replicating the
    /// positional/named structure. Factories are never forwarded;
    /// neither are private constructors across a library boundary. A
    /// superclass offering nothing accessible leaves the application
    /// with no constructors.
    pub(crate) fn synthesize_forwarding_constructors(&mut self, app: ClassId) -> ResolveResult<()> {
        let Some(superclass) =
            self.ctx.store.get(app).supertype().and_then(|t| t.class_id())
        else {
            return Ok(());
        };
        self.ensure_resolved(superclass)?;

        let app_library = self.ctx.store.get(app).library;
        let cross_library = self.ctx.store.get(superclass).library != app_library;

        let forwarders: Vec<Constructor> = self
            .ctx
            .store
            .get(superclass)
            .constructors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_generative())
            .filter(|(_, c)| !(cross_library && c.is_private()))
            .map(|(index, c)| Constructor {
                name: c.name.clone(),
                kind: ConstructorKind::Generative,
                required: c.required.clone(),
                optional: c.optional.clone(),
                named: c.named.clone(),
                origin: ConstructorOrigin::Forwarding {
                    target: ConstructorRef { class: superclass, index },
                },
                span: Span::synthetic(),
            })
            .collect();

        self.ctx.store.get_mut(app).constructors = forwarders;
        Ok(())
    }

    /// Walk the mixin pointers from a freshly installed application; if
    /// the walk returns to it, report `illegal-mixin-cycle` and cut the
    /// chain by clearing the mixin.
    pub(crate) fn check_mixin_cycle(&mut self, app: ClassId) {
        let mut visited = FxHashSet::default();
        visited.insert(app);
        let mut current = app;
        loop {
            let Some(next) =
                self.ctx.store.get(current).mixin.as_ref().and_then(|t| t.class_id())
            else {
                break;
            };
            if next == app {
                let name = self.ctx.store.get(app).name.clone();
                let span = self.ctx.store.get(app).span;
                debug!(class = %name, "mixin cycle");
                self.ctx.report(
                    Diagnostic::new(MessageKind::IllegalMixinCycle, span)
                        .with_arg("class", name),
                );
                let record = self.ctx.store.get_mut(app);
                record.mixin = None;
                record.has_incomplete_hierarchy = true;
                break;
            }
            if !self.ctx.store.get(next).is_mixin_application() || !visited.insert(next) {
                break;
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use vela_ast::builder::{
        ty, ty_args, ClassBuilder, CtorBuilder, LibraryBuilder, NamedMixinBuilder, ProgramBuilder,
    };
    use vela_ast::Program;
    use vela_core::{ClassId, MessageKind};

    use crate::context::{
        DefaultBackend, MixinSharing, ResolutionContext, ResolverConfig,
    };
    use crate::driver::{ResolutionOutput, ResolutionPass};
    use crate::element::{Capabilities, ClassKind, ConstructorOrigin};

    static BACKEND: DefaultBackend = DefaultBackend;

    fn resolve_with(
        program: &Program<'_>,
        sharing: MixinSharing,
    ) -> (ResolutionContext<'static>, ResolutionOutput) {
        let config = ResolverConfig { mixin_sharing: sharing, ..ResolverConfig::default() };
        let mut ctx = ResolutionContext::new(config, &BACKEND);
        let output = ResolutionPass::run(&mut ctx, program).unwrap();
        (ctx, output)
    }

    fn resolve(program: &Program<'_>) -> (ResolutionContext<'static>, ResolutionOutput) {
        resolve_with(program, MixinSharing::PerApplication)
    }

    /// Walk the supertype chain, returning class names from the class
    /// itself up to the root.
    fn supertype_chain(ctx: &ResolutionContext<'_>, from: ClassId) -> Vec<String> {
        let mut chain = vec![ctx.store().get(from).name.clone()];
        let mut current = from;
        while let Some(next) = ctx.store().get(current).supertype().and_then(|t| t.class_id()) {
            chain.push(ctx.store().get(next).name.clone());
            current = next;
        }
        chain
    }

    fn synthetic_count(ctx: &ResolutionContext<'_>) -> usize {
        ctx.store()
            .iter()
            .filter(|r| r.kind == ClassKind::SyntheticMixinApplication)
            .count()
    }

    #[test]
    fn named_application_builds_the_full_chain() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M1"));
        lib.class(ClassBuilder::new(&arena, "M2"));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D", "A", &["M1", "M2"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let d = ctx.lookup_class("D").unwrap();
        assert_eq!(
            supertype_chain(&ctx, d),
            vec!["D", "_A&M1&M2", "_A&M1", "A", "Object"]
        );
        assert_eq!(synthetic_count(&ctx), 2);

        // Every link carries a forwarder for A's default constructor.
        let m2 = ctx.lookup_class("M2").unwrap();
        let record = ctx.store().get(d);
        assert_eq!(record.kind, ClassKind::NamedMixinApplication);
        assert_eq!(record.mixin.as_ref().and_then(|t| t.class_id()), Some(m2));
        assert_eq!(record.constructors.len(), 1);
        assert_eq!(record.constructors[0].name, "");
        assert!(matches!(record.constructors[0].origin, ConstructorOrigin::Forwarding { .. }));

        let x2 = record.supertype().and_then(|t| t.class_id()).unwrap();
        let x2_record = ctx.store().get(x2);
        assert!(x2_record.capabilities.contains(Capabilities::IS_SYNTHETIC | Capabilities::HAS_MIXIN));
        assert_eq!(x2_record.constructors.len(), 1);
        assert!(matches!(x2_record.constructors[0].origin, ConstructorOrigin::Forwarding { .. }));
        // The last intermediate's interface list begins with its mixin.
        assert_eq!(x2_record.interfaces()[0].class_id(), Some(m2));
    }

    #[test]
    fn named_application_interfaces_start_with_the_last_mixin() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M1"));
        lib.class(ClassBuilder::new(&arena, "M2"));
        lib.class(ClassBuilder::new(&arena, "I"));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D", "A", &["M1", "M2"]).implements("I"));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let d = ctx.lookup_class("D").unwrap();
        let names: Vec<_> = ctx
            .store()
            .get(d)
            .interfaces()
            .iter()
            .filter_map(|t| t.class_id())
            .map(|c| ctx.store().get(c).name.clone())
            .collect();
        assert_eq!(names, vec!["M2", "I"]);
    }

    #[test]
    fn anonymous_application_extends_the_last_link() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M"));
        lib.class(ClassBuilder::new(&arena, "C").with_mixins("A", &["M"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let c = ctx.lookup_class("C").unwrap();
        assert_eq!(supertype_chain(&ctx, c), vec!["C", "_A&M", "A", "Object"]);

        let record = ctx.store().get(c);
        // The anonymous application belongs to the chain, not to C: C is
        // a regular class with a synthesized default constructor.
        assert_eq!(record.kind, ClassKind::Regular);
        assert!(record.mixin.is_none());
        assert!(matches!(
            record.constructors[0].origin,
            ConstructorOrigin::SynthesizedDefault { target: Some(_) }
        ));

        // The intermediate implements its mixin, so C satisfies M.
        let m = ctx.lookup_class("M").unwrap();
        assert!(ctx.store().get(c).all_supertypes().unwrap().contains_class(m));
    }

    #[test]
    fn chain_length_equals_mixin_count() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M1"));
        lib.class(ClassBuilder::new(&arena, "M2"));
        lib.class(ClassBuilder::new(&arena, "M3"));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D", "A", &["M1", "M2", "M3"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        assert_eq!(synthetic_count(&ctx), 3);
        let d = ctx.lookup_class("D").unwrap();
        // D, three links, A, Object.
        assert_eq!(supertype_chain(&ctx, d).len(), 6);
    }

    #[test]
    fn forwarders_replicate_signatures_and_skip_factories() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(
            ClassBuilder::new(&arena, "S")
                .constructor(CtorBuilder::unnamed(&arena).required("a").named_param("b"))
                .constructor(CtorBuilder::named(&arena, "of").optional("x"))
                .constructor(CtorBuilder::named(&arena, "make").factory()),
        );
        lib.class(ClassBuilder::new(&arena, "M"));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D", "S", &["M"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let d = ctx.lookup_class("D").unwrap();
        let record = ctx.store().get(d);
        let names: Vec<_> = record.constructors.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["", "of"]); // factory "make" is not forwarded

        let unnamed = &record.constructors[0];
        assert_eq!(unnamed.required, vec!["a"]);
        assert_eq!(unnamed.named, vec!["b"]);
        let of = &record.constructors[1];
        assert_eq!(of.optional, vec!["x"]);
    }

    #[test]
    fn private_constructors_are_not_forwarded_across_libraries() {
        let arena = Bump::new();
        let mut base = LibraryBuilder::new(&arena, "base");
        base.class(
            ClassBuilder::new(&arena, "S")
                .constructor(CtorBuilder::named(&arena, "_hidden"))
                .constructor(CtorBuilder::named(&arena, "visible")),
        );
        let mut app = LibraryBuilder::new(&arena, "app");
        app.import("base");
        app.class(ClassBuilder::new(&arena, "M"));
        app.named_mixin(NamedMixinBuilder::new(&arena, "D", "S", &["M"]));
        let program = ProgramBuilder::new(&arena).library(base).library(app).build();
        let (ctx, output) = resolve(&program);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let d = ctx.lookup_class("D").unwrap();
        let names: Vec<_> =
            ctx.store().get(d).constructors.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["visible"]);

        // Same application inside the declaring library keeps both.
        let mut base2 = LibraryBuilder::new(&arena, "base");
        base2.class(
            ClassBuilder::new(&arena, "S")
                .constructor(CtorBuilder::named(&arena, "_hidden"))
                .constructor(CtorBuilder::named(&arena, "visible")),
        );
        base2.class(ClassBuilder::new(&arena, "M"));
        base2.named_mixin(NamedMixinBuilder::new(&arena, "D", "S", &["M"]));
        let program = ProgramBuilder::new(&arena).library(base2).build();
        let (ctx, output) = resolve(&program);
        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        let d = ctx.lookup_class("D").unwrap();
        let names: Vec<_> =
            ctx.store().get(d).constructors.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["_hidden", "visible"]);
    }

    #[test]
    fn invalid_mixin_truncates_the_chain() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M1"));
        lib.enum_("E", &["a"]);
        lib.class(ClassBuilder::new(&arena, "C").with_mixins("A", &["M1", "E", "M1"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert_eq!(output.diagnostics.count_of(MessageKind::CannotMixinEnum), 1);
        let c = ctx.lookup_class("C").unwrap();
        // Chain stops after the last valid link.
        assert_eq!(supertype_chain(&ctx, c), vec!["C", "_A&M1", "A", "Object"]);
        assert!(ctx.store().get(c).has_incomplete_hierarchy);
    }

    #[test]
    fn self_mixin_cycle_is_reported_once_and_cut() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.named_mixin(NamedMixinBuilder::new(&arena, "M1", "Object", &["M1"]));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "F", "Object", &["M1"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve(&program);

        assert_eq!(output.diagnostics.count_of(MessageKind::IllegalMixinCycle), 1);
        let m1 = ctx.lookup_class("M1").unwrap();
        let f = ctx.lookup_class("F").unwrap();
        assert!(ctx.store().get(m1).mixin.is_none()); // cut
        assert!(ctx.store().get(m1).has_incomplete_hierarchy);
        // F inherits the truncation from its (incomplete) chain.
        assert!(ctx.store().get(f).has_incomplete_hierarchy);
        assert!(ctx.store().get(f).all_supertypes().is_some());
    }

    #[test]
    fn sharing_interns_identical_signatures() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "M"));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D1", "A", &["M"]));
        lib.named_mixin(NamedMixinBuilder::new(&arena, "D2", "A", &["M"]));
        let program = ProgramBuilder::new(&arena).library(lib).build();

        let (ctx, output) = resolve_with(&program, MixinSharing::SharedPerLibrary);
        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        assert_eq!(synthetic_count(&ctx), 1);
        let d1 = ctx.lookup_class("D1").unwrap();
        let d2 = ctx.lookup_class("D2").unwrap();
        assert_eq!(
            ctx.store().get(d1).supertype().and_then(|t| t.class_id()),
            ctx.store().get(d2).supertype().and_then(|t| t.class_id()),
        );

        // The per-application strategy never shares.
        let (ctx, _) = resolve_with(&program, MixinSharing::PerApplication);
        assert_eq!(synthetic_count(&ctx), 2);
    }

    #[test]
    fn sharing_abstracts_over_type_parameters() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A").type_param("T"));
        lib.class(ClassBuilder::new(&arena, "M"));
        lib.named_mixin(
            NamedMixinBuilder::with_types(
                &arena,
                "D1",
                ty_args(&arena, "A", &[ty(&arena, "T")]),
                &[ty(&arena, "M")],
            )
            .type_param("T"),
        );
        lib.named_mixin(
            NamedMixinBuilder::with_types(
                &arena,
                "D2",
                ty_args(&arena, "A", &[ty(&arena, "S")]),
                &[ty(&arena, "M")],
            )
            .type_param("S"),
        );
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve_with(&program, MixinSharing::SharedPerLibrary);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        // Both applications have signature ^#T0: one shared intermediate.
        assert_eq!(synthetic_count(&ctx), 1);

        let d1 = ctx.lookup_class("D1").unwrap();
        let d2 = ctx.lookup_class("D2").unwrap();
        let x1 = ctx.store().get(d1).supertype().unwrap().as_instance().unwrap().clone();
        let x2 = ctx.store().get(d2).supertype().unwrap().as_instance().unwrap().clone();
        assert_eq!(x1.class, x2.class);
        // Each named class instantiates the shared link with its own
        // type variable.
        assert_eq!(x1.args, vec![crate::types::ResolvedType::variable(d1, 0)]);
        assert_eq!(x2.args, vec![crate::types::ResolvedType::variable(d2, 0)]);
        // The shared link's parameters are the free-variable
        // placeholders.
        let link = ctx.store().get(x1.class);
        assert_eq!(link.type_params.len(), 1);
        assert_eq!(link.type_params[0].name, "#T0");
    }

    #[test]
    fn sharing_distinguishes_different_signatures() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A").type_param("T"));
        lib.class(ClassBuilder::new(&arena, "M"));
        lib.class(ClassBuilder::new(&arena, "P"));
        // D1 forwards its own parameter; D2 pins a concrete argument.
        lib.named_mixin(
            NamedMixinBuilder::with_types(
                &arena,
                "D1",
                ty_args(&arena, "A", &[ty(&arena, "T")]),
                &[ty(&arena, "M")],
            )
            .type_param("T"),
        );
        lib.named_mixin(NamedMixinBuilder::with_types(
            &arena,
            "D2",
            ty_args(&arena, "A", &[ty(&arena, "P")]),
            &[ty(&arena, "M")],
        ));
        let program = ProgramBuilder::new(&arena).library(lib).build();
        let (ctx, output) = resolve_with(&program, MixinSharing::SharedPerLibrary);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        // ^#T0 vs ^#U0: different keys, two intermediates.
        assert_eq!(synthetic_count(&ctx), 2);
    }

    #[test]
    fn sharing_is_per_library() {
        let arena = Bump::new();
        let mut lib_a = LibraryBuilder::new(&arena, "liba");
        lib_a.class(ClassBuilder::new(&arena, "A"));
        lib_a.class(ClassBuilder::new(&arena, "M"));
        lib_a.named_mixin(NamedMixinBuilder::new(&arena, "D1", "A", &["M"]));
        let mut lib_b = LibraryBuilder::new(&arena, "libb");
        lib_b.import("liba");
        lib_b.named_mixin(NamedMixinBuilder::new(&arena, "D2", "A", &["M"]));
        let program = ProgramBuilder::new(&arena).library(lib_a).library(lib_b).build();
        let (ctx, output) = resolve_with(&program, MixinSharing::SharedPerLibrary);

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
        // One intermediate per library.
        assert_eq!(synthetic_count(&ctx), 2);
    }
}

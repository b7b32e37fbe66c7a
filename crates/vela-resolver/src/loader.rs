//! Supertype loading.
//!
//! Before a class resolves, every class it names directly as a
//! supertype, mixin, or interface must at least have a bound identity.
//! The loader guarantees that with a depth-first walk over the
//! supertype-naming graph: a class is marked *load-started* before its
//! names are followed, so revisiting a load-started class is a naming
//! cycle. The cycle is reported once, and the revisited class is preset
//! with the root as its supertype and flagged, cutting the chain before
//! the class resolver ever sees it.

use tracing::debug;
use vela_ast::{Item, SuperclassClause, TypeAnnotation};
use vela_core::{Diagnostic, MessageKind, ResolveResult};
use vela_core::ClassId;

use crate::driver::ResolutionPass;
use crate::element::LoadState;
use crate::scope::Binding;
use crate::types::ResolvedType;

/// The type annotations a declaration names in supertype position:
/// extends / mixin base / mixins / interfaces, in source order.
fn named_supertypes<'ast>(item: &Item<'ast>) -> Vec<TypeAnnotation<'ast>> {
    let mut names = Vec::new();
    match item {
        Item::Class(decl) => {
            match &decl.superclass {
                SuperclassClause::None => {}
                SuperclassClause::Extends(annotation) => names.push(*annotation),
                SuperclassClause::With(clause) => {
                    names.push(clause.base);
                    names.extend_from_slice(clause.mixins);
                }
            }
            names.extend_from_slice(decl.interfaces);
        }
        Item::NamedMixin(decl) => {
            names.push(decl.clause.base);
            names.extend_from_slice(decl.clause.mixins);
            names.extend_from_slice(decl.interfaces);
        }
        Item::Enum(_) => {}
    }
    names
}

impl<'ast, 'c, 'b> ResolutionPass<'ast, 'c, 'b> {
    /// Load the supertype names of a class, depth-first.
    pub(crate) fn load_supertypes(&mut self, id: ClassId) -> ResolveResult<()> {
        match self.ctx.store.try_get(id)?.load_state {
            LoadState::Done => return Ok(()),
            LoadState::Started => return self.break_naming_cycle(id),
            LoadState::Unstarted => {}
        }
        self.ctx.store.get_mut(id).load_state = LoadState::Started;

        if let Some(item) = self.decls.get(&id).copied() {
            let library = self.ctx.store.get(id).library;
            for annotation in named_supertypes(&item) {
                let prefix = annotation.prefix.map(|p| p.name);
                if let Ok(Binding::Class(target)) =
                    self.ctx.lookup(library, Some(id), prefix, annotation.name.name)
                {
                    self.load_supertypes(target)?;
                }
            }
        }

        self.ctx.store.get_mut(id).load_state = LoadState::Done;
        Ok(())
    }

    /// A load-started class was revisited: report the hierarchy cycle and
    /// cut the chain at the root before the class resolver runs.
    fn break_naming_cycle(&mut self, id: ClassId) -> ResolveResult<()> {
        let root = self.ctx.root();
        let (name, span, preset) = {
            let record = self.ctx.store.get(id);
            (record.name.clone(), record.span, record.supertype().is_some())
        };
        debug!(class = %name, "supertype naming cycle");
        self.ctx.report(
            Diagnostic::new(MessageKind::CannotExtend, span)
                .with_arg("class", name)
                .with_arg("cause", "cyclic hierarchy"),
        );

        let root_arity = self.ctx.store.get(root).type_params.len();
        let record = self.ctx.store.get_mut(id);
        record.has_incomplete_hierarchy = true;
        if !preset && id != root {
            record.set_supertype(ResolvedType::raw(root, root_arity))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use vela_ast::builder::{ClassBuilder, LibraryBuilder, ProgramBuilder};
    use vela_core::MessageKind;

    use crate::context::{DefaultBackend, ResolutionContext, ResolverConfig};
    use crate::driver::ResolutionPass;

    #[test]
    fn self_extension_is_cut_at_the_root() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A").extends("A"));
        let program = ProgramBuilder::new(&arena).library(lib).build();

        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let output = ResolutionPass::run(&mut ctx, &program).unwrap();

        assert_eq!(output.diagnostics.count_of(MessageKind::CannotExtend), 1);
        let a = ctx.lookup_class("A").unwrap();
        let record = ctx.store().get(a);
        assert!(record.has_incomplete_hierarchy);
        assert_eq!(record.supertype().and_then(|t| t.class_id()), Some(ctx.root()));
    }

    #[test]
    fn mutual_extension_reports_once() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A").extends("B"));
        lib.class(ClassBuilder::new(&arena, "B").extends("A"));
        let program = ProgramBuilder::new(&arena).library(lib).build();

        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let output = ResolutionPass::run(&mut ctx, &program).unwrap();

        assert_eq!(output.diagnostics.count_of(MessageKind::CannotExtend), 1);
        // The cycle head is cut at the root; the other class keeps its
        // written supertype.
        let a = ctx.lookup_class("A").unwrap();
        let b = ctx.lookup_class("B").unwrap();
        assert_eq!(
            ctx.store().get(a).supertype().and_then(|t| t.class_id()),
            Some(ctx.root())
        );
        assert_eq!(ctx.store().get(b).supertype().and_then(|t| t.class_id()), Some(a));
        assert!(ctx.store().get(a).has_incomplete_hierarchy);
    }

    #[test]
    fn diamonds_are_not_cycles() {
        let arena = Bump::new();
        let mut lib = LibraryBuilder::new(&arena, "app");
        lib.class(ClassBuilder::new(&arena, "A"));
        lib.class(ClassBuilder::new(&arena, "B").extends("A"));
        lib.class(ClassBuilder::new(&arena, "C").extends("A"));
        lib.class(ClassBuilder::new(&arena, "D").extends("B").implements("C"));
        let program = ProgramBuilder::new(&arena).library(lib).build();

        let backend = DefaultBackend;
        let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
        let output = ResolutionPass::run(&mut ctx, &program).unwrap();

        assert!(output.is_ok(), "diagnostics: {}", output.diagnostics);
    }
}

//! Type-expression resolution.
//!
//! Turns a syntactic [`TypeAnnotation`] into a [`ResolvedType`] against
//! the enclosing class scope. Every failure reports a diagnostic and
//! produces the malformed sentinel carrying a copy of it, so callers can
//! keep resolving.
//!
//! Raw references to a generic class instantiate it with all-dynamic
//! arguments; arity mismatches and misused type variables are malformed.

use vela_ast::TypeAnnotation;
use vela_core::{ClassId, Diagnostic, LibraryId, MessageKind};

use crate::context::ResolutionContext;
use crate::scope::{Binding, LookupError};
use crate::types::ResolvedType;

/// Resolves type annotations in the scope of one library and an optional
/// enclosing class (whose type parameters are visible).
pub struct TypeExprResolver<'a, 'b> {
    ctx: &'a mut ResolutionContext<'b>,
    library: LibraryId,
    enclosing: Option<ClassId>,
}

impl<'a, 'b> TypeExprResolver<'a, 'b> {
    /// Create a resolver for the given scope.
    pub fn new(
        ctx: &'a mut ResolutionContext<'b>,
        library: LibraryId,
        enclosing: Option<ClassId>,
    ) -> Self {
        Self { ctx, library, enclosing }
    }

    /// Resolve an annotation to a type.
    pub fn resolve(&mut self, annotation: &TypeAnnotation<'_>) -> ResolvedType {
        if annotation.is_dynamic() {
            return ResolvedType::Dynamic;
        }

        let prefix = annotation.prefix.map(|p| p.name);
        let binding = self
            .ctx
            .lookup(self.library, self.enclosing, prefix, annotation.name.name);

        match binding {
            Ok(Binding::TypeParam { owner, index }) => {
                if annotation.args.is_empty() {
                    ResolvedType::variable(owner, index)
                } else {
                    self.malformed(
                        Diagnostic::new(MessageKind::CannotResolveType, annotation.span)
                            .with_arg("type", annotation.written_name())
                            .with_arg("reason", "type variables take no arguments"),
                    )
                }
            }
            Ok(Binding::Class(class)) => self.resolve_instantiation(class, annotation),
            Err(LookupError::NotAPrefix { prefix }) => self.malformed(
                Diagnostic::new(MessageKind::NotAPrefix, annotation.span)
                    .with_arg("prefix", prefix),
            ),
            Err(LookupError::NotAType { name }) => self.malformed(
                Diagnostic::new(MessageKind::CannotResolveType, annotation.span)
                    .with_arg("type", name),
            ),
            Err(LookupError::NotFound) => self.malformed(
                Diagnostic::new(MessageKind::CannotResolveType, annotation.span)
                    .with_arg("type", annotation.written_name()),
            ),
        }
    }

    fn resolve_instantiation(
        &mut self,
        class: ClassId,
        annotation: &TypeAnnotation<'_>,
    ) -> ResolvedType {
        let arity = self.ctx.store().get(class).type_params.len();

        if annotation.args.is_empty() {
            return ResolvedType::raw(class, arity);
        }
        if annotation.args.len() != arity {
            return self.malformed(
                Diagnostic::new(MessageKind::CannotResolveType, annotation.span)
                    .with_arg("type", annotation.written_name())
                    .with_arg("expected", arity.to_string())
                    .with_arg("found", annotation.args.len().to_string()),
            );
        }

        let args = annotation.args.iter().map(|arg| self.resolve(arg)).collect();
        ResolvedType::instance(class, args)
    }

    /// Report a diagnostic and return the malformed sentinel carrying it.
    fn malformed(&mut self, diagnostic: Diagnostic) -> ResolvedType {
        self.ctx.report(diagnostic.clone());
        ResolvedType::malformed(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use vela_ast::builder::{ty, ty_args, ty_prefixed};
    use vela_core::Span;

    use crate::context::{DefaultBackend, ResolverConfig};
    use crate::element::{ClassKind, TypeParameter};

    struct Fixture {
        backend: DefaultBackend,
    }

    impl Fixture {
        fn new() -> Self {
            Self { backend: DefaultBackend }
        }

        fn context(&self) -> (ResolutionContext<'_>, LibraryId) {
            let mut ctx = ResolutionContext::new(ResolverConfig::default(), &self.backend);
            let app = ctx.add_library("app");
            (ctx, app)
        }
    }

    fn declare(ctx: &mut ResolutionContext<'_>, library: LibraryId, name: &str, arity: u16) -> ClassId {
        let class = ctx.store.alloc(name, library, ClassKind::Regular, Span::synthetic());
        for index in 0..arity {
            ctx.store.get_mut(class).type_params.push(TypeParameter {
                name: format!("T{}", index),
                owner: class,
                index,
                bound: None,
                span: Span::synthetic(),
            });
        }
        ctx.library_mut(library).scope.define(name, class);
        ctx.library_mut(library).declared.push((name.to_string(), class));
        class
    }

    #[test]
    fn resolve_dynamic() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let arena = Bump::new();
        let result = TypeExprResolver::new(&mut ctx, app, None).resolve(&ty(&arena, "dynamic"));
        assert_eq!(result, ResolvedType::Dynamic);
    }

    #[test]
    fn raw_generic_gets_dynamic_arguments() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let list = declare(&mut ctx, app, "List", 1);
        let arena = Bump::new();

        let result = TypeExprResolver::new(&mut ctx, app, None).resolve(&ty(&arena, "List"));
        assert_eq!(result, ResolvedType::raw(list, 1));
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn arity_mismatch_is_malformed() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        declare(&mut ctx, app, "List", 1);
        let arena = Bump::new();
        let ann = {
            let a = ty(&arena, "dynamic");
            ty_args(&arena, "List", &[a, a])
        };

        let result = TypeExprResolver::new(&mut ctx, app, None).resolve(&ann);
        assert!(result.is_malformed());
        assert_eq!(ctx.diagnostics.count_of(MessageKind::CannotResolveType), 1);
        let diagnostic = ctx.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.arg("expected"), Some("1"));
        assert_eq!(diagnostic.arg("found"), Some("2"));
    }

    #[test]
    fn unknown_name_is_malformed() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let arena = Bump::new();

        let result = TypeExprResolver::new(&mut ctx, app, None).resolve(&ty(&arena, "Missing"));
        assert!(result.is_malformed());
        assert_eq!(ctx.diagnostics.count_of(MessageKind::CannotResolveType), 1);
    }

    #[test]
    fn type_parameter_resolves_to_variable() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let class = declare(&mut ctx, app, "Box", 1);
        let arena = Bump::new();

        let result = TypeExprResolver::new(&mut ctx, app, Some(class)).resolve(&ty(&arena, "T0"));
        assert_eq!(result, ResolvedType::variable(class, 0));
    }

    #[test]
    fn type_parameter_with_arguments_is_malformed() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let class = declare(&mut ctx, app, "Box", 1);
        let arena = Bump::new();
        let ann = {
            let a = ty(&arena, "dynamic");
            ty_args(&arena, "T0", &[a])
        };

        let result = TypeExprResolver::new(&mut ctx, app, Some(class)).resolve(&ann);
        assert!(result.is_malformed());
    }

    #[test]
    fn bad_prefix_reports_not_a_prefix() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let arena = Bump::new();

        let result =
            TypeExprResolver::new(&mut ctx, app, None).resolve(&ty_prefixed(&arena, "p", "X"));
        assert!(result.is_malformed());
        assert_eq!(ctx.diagnostics.count_of(MessageKind::NotAPrefix), 1);
    }

    #[test]
    fn nested_arguments_resolve_recursively() {
        let fixture = Fixture::new();
        let (mut ctx, app) = fixture.context();
        let list = declare(&mut ctx, app, "List", 1);
        let item = declare(&mut ctx, app, "Item", 0);
        let arena = Bump::new();
        let ann = {
            let inner = ty(&arena, "Item");
            ty_args(&arena, "List", &[inner])
        };

        let result = TypeExprResolver::new(&mut ctx, app, None).resolve(&ann);
        assert_eq!(
            result,
            ResolvedType::instance(list, vec![ResolvedType::raw(item, 0)])
        );
    }
}

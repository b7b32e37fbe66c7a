//! Arena-backed construction of declaration trees.
//!
//! The front end's parser produces [`Program`] values directly; everyone
//! else (tests, tooling, embedders) assembles them here. Builders collect
//! into ordinary vectors and copy into the arena when finished, so nodes
//! keep their `Copy` + `&'ast` slice shape.
//!
//! ```
//! use bumpalo::Bump;
//! use vela_ast::builder::{ClassBuilder, LibraryBuilder, ProgramBuilder};
//!
//! let arena = Bump::new();
//! let mut lib = LibraryBuilder::new(&arena, "app");
//! lib.class(ClassBuilder::new(&arena, "A"));
//! lib.class(ClassBuilder::new(&arena, "B").extends("A").implements("I"));
//! lib.class(ClassBuilder::new(&arena, "I"));
//! let program = ProgramBuilder::new(&arena).library(lib).build();
//! assert_eq!(program.libraries.len(), 1);
//! ```

use bumpalo::Bump;
use vela_core::Span;

use crate::decl::{
    ClassDecl, ConstructorDecl, CtorParam, EnumDecl, ImportDecl, Item, LibraryDecl, MemberDecl,
    MixinClause, NamedMixinDecl, OtherMemberDecl, ParamKind, Program, SuperclassClause,
    TypeParamNode,
};
use crate::types::{Ident, TypeAnnotation};

/// Allocate an identifier with a synthetic span.
pub fn ident<'ast>(arena: &'ast Bump, name: &str) -> Ident<'ast> {
    Ident::new(arena.alloc_str(name), Span::synthetic())
}

/// A bare raw type annotation.
pub fn ty<'ast>(arena: &'ast Bump, name: &str) -> TypeAnnotation<'ast> {
    TypeAnnotation::simple(ident(arena, name))
}

/// A generic type annotation with the given arguments.
pub fn ty_args<'ast>(
    arena: &'ast Bump,
    name: &str,
    args: &[TypeAnnotation<'ast>],
) -> TypeAnnotation<'ast> {
    let name = ident(arena, name);
    TypeAnnotation::new(None, name, arena.alloc_slice_copy(args), name.span)
}

/// A prefixed type annotation (`prefix.Name`).
pub fn ty_prefixed<'ast>(arena: &'ast Bump, prefix: &str, name: &str) -> TypeAnnotation<'ast> {
    let name = ident(arena, name);
    TypeAnnotation::new(Some(ident(arena, prefix)), name, &[], name.span)
}

/// Builds a [`Program`].
pub struct ProgramBuilder<'ast> {
    arena: &'ast Bump,
    libraries: Vec<LibraryDecl<'ast>>,
}

impl<'ast> ProgramBuilder<'ast> {
    /// Start a program in the given arena.
    pub fn new(arena: &'ast Bump) -> Self {
        Self { arena, libraries: Vec::new() }
    }

    /// Add a finished library.
    pub fn library(mut self, library: LibraryBuilder<'ast>) -> Self {
        self.libraries.push(library.build());
        self
    }

    /// Finish the program.
    pub fn build(self) -> Program<'ast> {
        Program::new(self.arena.alloc_slice_copy(&self.libraries))
    }
}

/// Builds a [`LibraryDecl`].
pub struct LibraryBuilder<'ast> {
    arena: &'ast Bump,
    name: Ident<'ast>,
    imports: Vec<ImportDecl<'ast>>,
    items: Vec<Item<'ast>>,
}

impl<'ast> LibraryBuilder<'ast> {
    /// Start a library.
    pub fn new(arena: &'ast Bump, name: &str) -> Self {
        Self { arena, name: ident(arena, name), imports: Vec::new(), items: Vec::new() }
    }

    /// Import another library into the open scope.
    pub fn import(&mut self, library: &str) -> &mut Self {
        self.imports.push(ImportDecl {
            library: ident(self.arena, library),
            prefix: None,
            span: Span::synthetic(),
        });
        self
    }

    /// Import another library through a prefix.
    pub fn import_as(&mut self, library: &str, prefix: &str) -> &mut Self {
        self.imports.push(ImportDecl {
            library: ident(self.arena, library),
            prefix: Some(ident(self.arena, prefix)),
            span: Span::synthetic(),
        });
        self
    }

    /// Add a class.
    pub fn class(&mut self, class: ClassBuilder<'ast>) -> &mut Self {
        self.items.push(Item::Class(class.build()));
        self
    }

    /// Add a named mixin application.
    pub fn named_mixin(&mut self, decl: NamedMixinBuilder<'ast>) -> &mut Self {
        self.items.push(Item::NamedMixin(decl.build()));
        self
    }

    /// Add an enum with the given values.
    pub fn enum_(&mut self, name: &str, values: &[&str]) -> &mut Self {
        let values: Vec<Ident<'ast>> = values.iter().map(|v| ident(self.arena, v)).collect();
        self.items.push(Item::Enum(EnumDecl {
            name: ident(self.arena, name),
            values: self.arena.alloc_slice_copy(&values),
            span: Span::synthetic(),
        }));
        self
    }

    /// Finish the library.
    pub fn build(self) -> LibraryDecl<'ast> {
        LibraryDecl {
            name: self.name,
            imports: self.arena.alloc_slice_copy(&self.imports),
            items: self.arena.alloc_slice_copy(&self.items),
            span: Span::synthetic(),
        }
    }
}

/// Builds a [`ClassDecl`].
pub struct ClassBuilder<'ast> {
    arena: &'ast Bump,
    name: Ident<'ast>,
    is_abstract: bool,
    type_params: Vec<TypeParamNode<'ast>>,
    superclass: SuperclassClause<'ast>,
    interfaces: Vec<TypeAnnotation<'ast>>,
    members: Vec<MemberDecl<'ast>>,
}

impl<'ast> ClassBuilder<'ast> {
    /// Start a class.
    pub fn new(arena: &'ast Bump, name: &str) -> Self {
        Self {
            arena,
            name: ident(arena, name),
            is_abstract: false,
            type_params: Vec::new(),
            superclass: SuperclassClause::None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Mark the class abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add an unbounded type parameter.
    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamNode {
            name: ident(self.arena, name),
            bound: None,
            span: Span::synthetic(),
        });
        self
    }

    /// Add a type parameter with a bound annotation.
    pub fn type_param_bounded(mut self, name: &str, bound: TypeAnnotation<'ast>) -> Self {
        self.type_params.push(TypeParamNode {
            name: ident(self.arena, name),
            bound: Some(bound),
            span: Span::synthetic(),
        });
        self
    }

    /// `extends` a raw named superclass.
    pub fn extends(self, name: &str) -> Self {
        let annotation = ty(self.arena, name);
        self.extends_type(annotation)
    }

    /// `extends` an arbitrary annotation.
    pub fn extends_type(mut self, annotation: TypeAnnotation<'ast>) -> Self {
        self.superclass = SuperclassClause::Extends(annotation);
        self
    }

    /// `extends base with mixins…`, raw names.
    pub fn with_mixins(self, base: &str, mixins: &[&str]) -> Self {
        let base = ty(self.arena, base);
        let mixins: Vec<TypeAnnotation<'ast>> =
            mixins.iter().map(|m| ty(self.arena, m)).collect();
        self.with_mixin_types(base, &mixins)
    }

    /// `extends base with mixins…`, arbitrary annotations.
    pub fn with_mixin_types(
        mut self,
        base: TypeAnnotation<'ast>,
        mixins: &[TypeAnnotation<'ast>],
    ) -> Self {
        self.superclass = SuperclassClause::With(MixinClause {
            base,
            mixins: self.arena.alloc_slice_copy(mixins),
            span: Span::synthetic(),
        });
        self
    }

    /// Add a raw named interface.
    pub fn implements(self, name: &str) -> Self {
        let annotation = ty(self.arena, name);
        self.implements_type(annotation)
    }

    /// Add an interface annotation.
    pub fn implements_type(mut self, annotation: TypeAnnotation<'ast>) -> Self {
        self.interfaces.push(annotation);
        self
    }

    /// Add a constructor.
    pub fn constructor(mut self, ctor: CtorBuilder<'ast>) -> Self {
        self.members.push(MemberDecl::Constructor(ctor.build()));
        self
    }

    /// Add an opaque member.
    pub fn member(mut self, name: &str) -> Self {
        self.members.push(MemberDecl::Other(OtherMemberDecl {
            name: ident(self.arena, name),
            span: Span::synthetic(),
        }));
        self
    }

    /// Finish the class.
    pub fn build(self) -> ClassDecl<'ast> {
        ClassDecl {
            name: self.name,
            is_abstract: self.is_abstract,
            type_params: self.arena.alloc_slice_copy(&self.type_params),
            superclass: self.superclass,
            interfaces: self.arena.alloc_slice_copy(&self.interfaces),
            members: self.arena.alloc_slice_copy(&self.members),
            span: Span::synthetic(),
        }
    }
}

/// Builds a [`NamedMixinDecl`].
pub struct NamedMixinBuilder<'ast> {
    arena: &'ast Bump,
    name: Ident<'ast>,
    is_abstract: bool,
    type_params: Vec<TypeParamNode<'ast>>,
    base: TypeAnnotation<'ast>,
    mixins: Vec<TypeAnnotation<'ast>>,
    interfaces: Vec<TypeAnnotation<'ast>>,
}

impl<'ast> NamedMixinBuilder<'ast> {
    /// Start `class name = base with …;` with raw names.
    pub fn new(arena: &'ast Bump, name: &str, base: &str, mixins: &[&str]) -> Self {
        let base = ty(arena, base);
        let mixins = mixins.iter().map(|m| ty(arena, m)).collect();
        Self {
            arena,
            name: ident(arena, name),
            is_abstract: false,
            type_params: Vec::new(),
            base,
            mixins,
            interfaces: Vec::new(),
        }
    }

    /// Start from arbitrary annotations.
    pub fn with_types(
        arena: &'ast Bump,
        name: &str,
        base: TypeAnnotation<'ast>,
        mixins: &[TypeAnnotation<'ast>],
    ) -> Self {
        Self {
            arena,
            name: ident(arena, name),
            is_abstract: false,
            type_params: Vec::new(),
            base,
            mixins: mixins.to_vec(),
            interfaces: Vec::new(),
        }
    }

    /// Mark the application abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add an unbounded type parameter.
    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(TypeParamNode {
            name: ident(self.arena, name),
            bound: None,
            span: Span::synthetic(),
        });
        self
    }

    /// Add a raw named interface.
    pub fn implements(mut self, name: &str) -> Self {
        self.interfaces.push(ty(self.arena, name));
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> NamedMixinDecl<'ast> {
        NamedMixinDecl {
            name: self.name,
            is_abstract: self.is_abstract,
            type_params: self.arena.alloc_slice_copy(&self.type_params),
            clause: MixinClause {
                base: self.base,
                mixins: self.arena.alloc_slice_copy(&self.mixins),
                span: Span::synthetic(),
            },
            interfaces: self.arena.alloc_slice_copy(&self.interfaces),
            span: Span::synthetic(),
        }
    }
}

/// Builds a [`ConstructorDecl`].
pub struct CtorBuilder<'ast> {
    arena: &'ast Bump,
    name: Option<Ident<'ast>>,
    is_factory: bool,
    params: Vec<CtorParam<'ast>>,
}

impl<'ast> CtorBuilder<'ast> {
    /// Start the unnamed constructor.
    pub fn unnamed(arena: &'ast Bump) -> Self {
        Self { arena, name: None, is_factory: false, params: Vec::new() }
    }

    /// Start a named constructor.
    pub fn named(arena: &'ast Bump, name: &str) -> Self {
        Self { arena, name: Some(ident(arena, name)), is_factory: false, params: Vec::new() }
    }

    /// Mark as a factory.
    pub fn factory(mut self) -> Self {
        self.is_factory = true;
        self
    }

    /// Add a required positional parameter.
    pub fn required(self, name: &str) -> Self {
        self.param(name, ParamKind::Required)
    }

    /// Add an optional positional parameter.
    pub fn optional(self, name: &str) -> Self {
        self.param(name, ParamKind::OptionalPositional)
    }

    /// Add a named parameter.
    pub fn named_param(self, name: &str) -> Self {
        self.param(name, ParamKind::Named)
    }

    fn param(mut self, name: &str, kind: ParamKind) -> Self {
        self.params.push(CtorParam {
            name: ident(self.arena, name),
            kind,
            span: Span::synthetic(),
        });
        self
    }

    /// Finish the constructor.
    pub fn build(self) -> ConstructorDecl<'ast> {
        ConstructorDecl {
            name: self.name,
            is_factory: self.is_factory,
            params: self.arena.alloc_slice_copy(&self.params),
            span: Span::synthetic(),
        }
    }
}

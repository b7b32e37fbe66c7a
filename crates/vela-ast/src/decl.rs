//! Declaration nodes.
//!
//! Covers the class-like declarations hierarchy resolution consumes:
//! classes (with optional mixin clauses), named mixin applications, and
//! enums, grouped into libraries.

use vela_core::Span;

use crate::types::{Ident, TypeAnnotation};

/// A whole parsed program: every library participating in the compile.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    /// Libraries in declaration order.
    pub libraries: &'ast [LibraryDecl<'ast>],
}

impl<'ast> Program<'ast> {
    /// Create a program over the given libraries.
    pub fn new(libraries: &'ast [LibraryDecl<'ast>]) -> Self {
        Self { libraries }
    }
}

/// A library: a privacy boundary with its own imports and declarations.
#[derive(Debug, Clone, Copy)]
pub struct LibraryDecl<'ast> {
    /// Library name (e.g. `core`, `app`).
    pub name: Ident<'ast>,
    /// Imports, in declaration order.
    pub imports: &'ast [ImportDecl<'ast>],
    /// Top-level class-like declarations.
    pub items: &'ast [Item<'ast>],
    /// Source location.
    pub span: Span,
}

/// An import of another library, optionally through a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDecl<'ast> {
    /// The imported library's name.
    pub library: Ident<'ast>,
    /// Prefix for qualified references (`import x as p;` makes `p.Name`
    /// resolve into `x`). Unprefixed imports merge into the open scope.
    pub prefix: Option<Ident<'ast>>,
    /// Source location.
    pub span: Span,
}

/// A top-level class-like declaration.
#[derive(Debug, Clone, Copy)]
pub enum Item<'ast> {
    /// Regular class declaration.
    Class(ClassDecl<'ast>),
    /// Named mixin application: `class N = S with M1, M2 implements I;`.
    NamedMixin(NamedMixinDecl<'ast>),
    /// Enum declaration.
    Enum(EnumDecl<'ast>),
}

impl<'ast> Item<'ast> {
    /// The declared name.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Self::Class(d) => d.name,
            Self::NamedMixin(d) => d.name,
            Self::Enum(d) => d.name,
        }
    }

    /// The declaration's span.
    pub fn span(&self) -> Span {
        match self {
            Self::Class(d) => d.span,
            Self::NamedMixin(d) => d.span,
            Self::Enum(d) => d.span,
        }
    }
}

/// A regular class declaration.
#[derive(Debug, Clone, Copy)]
pub struct ClassDecl<'ast> {
    /// Class name.
    pub name: Ident<'ast>,
    /// Declared abstract.
    pub is_abstract: bool,
    /// Type parameters.
    pub type_params: &'ast [TypeParamNode<'ast>],
    /// What follows the name: nothing, `extends S`, or `extends S with M…`.
    pub superclass: SuperclassClause<'ast>,
    /// Implements clause, in declaration order.
    pub interfaces: &'ast [TypeAnnotation<'ast>],
    /// Member declarations.
    pub members: &'ast [MemberDecl<'ast>],
    /// Source location.
    pub span: Span,
}

/// The superclass position of a class declaration.
#[derive(Debug, Clone, Copy)]
pub enum SuperclassClause<'ast> {
    /// No clause; the host-configured default superclass applies.
    None,
    /// `extends S`.
    Extends(TypeAnnotation<'ast>),
    /// `extends S with M1, …` (anonymous mixin application).
    With(MixinClause<'ast>),
}

/// A `S with M1, …, Mk` clause.
#[derive(Debug, Clone, Copy)]
pub struct MixinClause<'ast> {
    /// The base `S`.
    pub base: TypeAnnotation<'ast>,
    /// The mixins `M1..Mk`, in application order. Never empty.
    pub mixins: &'ast [TypeAnnotation<'ast>],
    /// Source location of the whole clause.
    pub span: Span,
}

/// A named mixin application: `class N<T…> = S with M… implements I…;`.
#[derive(Debug, Clone, Copy)]
pub struct NamedMixinDecl<'ast> {
    /// The declared name `N`.
    pub name: Ident<'ast>,
    /// Declared abstract.
    pub is_abstract: bool,
    /// Type parameters.
    pub type_params: &'ast [TypeParamNode<'ast>],
    /// The `S with M…` clause.
    pub clause: MixinClause<'ast>,
    /// Implements clause.
    pub interfaces: &'ast [TypeAnnotation<'ast>],
    /// Source location.
    pub span: Span,
}

/// An enum declaration. Values are plain identifiers; their member
/// expansion happens outside hierarchy resolution.
#[derive(Debug, Clone, Copy)]
pub struct EnumDecl<'ast> {
    /// Enum name.
    pub name: Ident<'ast>,
    /// Declared values. An empty list is diagnosed.
    pub values: &'ast [Ident<'ast>],
    /// Source location.
    pub span: Span,
}

/// A type parameter declaration with an optional bound.
#[derive(Debug, Clone, Copy)]
pub struct TypeParamNode<'ast> {
    /// Parameter name.
    pub name: Ident<'ast>,
    /// `extends B` bound, if written.
    pub bound: Option<TypeAnnotation<'ast>>,
    /// Source location.
    pub span: Span,
}

/// A class member. Hierarchy resolution only distinguishes constructors;
/// everything else is opaque.
#[derive(Debug, Clone, Copy)]
pub enum MemberDecl<'ast> {
    /// A constructor.
    Constructor(ConstructorDecl<'ast>),
    /// Any other member (field, method, getter, …).
    Other(OtherMemberDecl<'ast>),
}

/// A constructor declaration.
#[derive(Debug, Clone, Copy)]
pub struct ConstructorDecl<'ast> {
    /// Constructor name; `None` is the unnamed constructor.
    pub name: Option<Ident<'ast>>,
    /// Declared as a factory.
    pub is_factory: bool,
    /// Parameters, positional before named.
    pub params: &'ast [CtorParam<'ast>],
    /// Source location.
    pub span: Span,
}

impl<'ast> ConstructorDecl<'ast> {
    /// Whether invoking this constructor requires at least one argument.
    pub fn requires_arguments(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::Required)
    }
}

/// A constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtorParam<'ast> {
    /// Parameter name.
    pub name: Ident<'ast>,
    /// How the parameter is passed.
    pub kind: ParamKind,
    /// Source location.
    pub span: Span,
}

/// Parameter passing kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Required positional.
    Required,
    /// Optional positional (`[x]`).
    OptionalPositional,
    /// Named (`{x}`).
    Named,
}

/// A non-constructor member, opaque beyond its name.
#[derive(Debug, Clone, Copy)]
pub struct OtherMemberDecl<'ast> {
    /// Member name.
    pub name: Ident<'ast>,
    /// Source location.
    pub span: Span,
}

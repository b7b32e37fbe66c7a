//! The parsed declaration tree consumed by the hierarchy resolver.
//!
//! All nodes are allocated in a caller-owned `bumpalo` arena and borrow
//! from it for the `'ast` lifetime, so a whole program is a handful of
//! contiguous allocations that drop at once. This crate ships no parser:
//! the front end's parser produces this tree, and embedders and tests
//! construct it through [`builder`].
//!
//! Only what hierarchy resolution needs is represented. Constructor
//! declarations carry their signature structure (required/optional
//! positional and named parameters) because synthesized forwarders must
//! replicate it; all other members are opaque names.

pub mod builder;
pub mod decl;
pub mod types;

pub use decl::{
    ClassDecl, ConstructorDecl, CtorParam, EnumDecl, ImportDecl, Item, LibraryDecl, MemberDecl,
    MixinClause, NamedMixinDecl, OtherMemberDecl, ParamKind, Program, SuperclassClause,
    TypeParamNode,
};
pub use types::{Ident, TypeAnnotation};

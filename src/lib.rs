//! Vela front-end class-hierarchy resolution.
//!
//! This facade re-exports the three workspace crates:
//!
//! - [`vela_core`]: spans, ids, diagnostics, the feature registry
//! - [`vela_ast`]: the parsed declaration tree and its builders
//! - [`vela_resolver`]: the hierarchy resolver itself
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use vela::ast::builder::{ClassBuilder, LibraryBuilder, ProgramBuilder};
//! use vela::{DefaultBackend, ResolutionContext, ResolutionPass, ResolverConfig};
//!
//! let arena = Bump::new();
//! let mut lib = LibraryBuilder::new(&arena, "app");
//! lib.class(ClassBuilder::new(&arena, "A"));
//! lib.class(ClassBuilder::new(&arena, "B").extends("A"));
//! let program = ProgramBuilder::new(&arena).library(lib).build();
//!
//! let backend = DefaultBackend;
//! let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
//! let output = ResolutionPass::run(&mut ctx, &program).unwrap();
//! assert!(output.is_ok());
//! ```

pub use vela_ast as ast;
pub use vela_core as core;
pub use vela_resolver as resolver;

pub use vela_core::{
    ClassId, Diagnostic, Diagnostics, Feature, FeatureLog, InternalError, LibraryId, MessageKind,
    Span,
};
pub use vela_resolver::{
    Backend, Capabilities, ClassKind, ClassRecord, ClassStore, Constructor, ConstructorKind,
    ConstructorOrigin, DefaultBackend, MixinSharing, ResolutionContext, ResolutionOutput,
    ResolutionPass, ResolvedType, ResolverConfig, SupertypeSet,
};

//! Class-hierarchy resolution for the Vela front end.
//!
//! Given a parsed [`vela_ast::Program`], computes for every class-like
//! declaration its fully resolved type descriptor: supertype, direct
//! interfaces, the linearized set of all transitive supertypes, the
//! synthetic chain introduced by mixin clauses, type-parameter bounds,
//! and synthesized default or forwarding constructors.
//!
//! ## Components
//!
//! - [`scope`]: name resolver façade (library scopes, import prefixes,
//!   type parameters)
//! - [`type_resolver`]: syntactic annotations → [`types::ResolvedType`]
//! - [`loader`]: first pass binding directly named supertypes, breaking
//!   naming cycles
//! - [`resolver`]: the per-class pipeline (bounds, supertype,
//!   interfaces, constructor synthesis)
//! - [`mixin`]: mixin-application expansion and interning
//! - [`linearize`]: the ordered supertype set
//! - [`driver`]: orchestration, registration, deferred checks
//!
//! ## Example
//!
//! ```
//! use bumpalo::Bump;
//! use vela_ast::builder::{ClassBuilder, LibraryBuilder, ProgramBuilder};
//! use vela_resolver::{DefaultBackend, ResolutionContext, ResolutionPass, ResolverConfig};
//!
//! let arena = Bump::new();
//! let mut lib = LibraryBuilder::new(&arena, "app");
//! lib.class(ClassBuilder::new(&arena, "A"));
//! let program = ProgramBuilder::new(&arena).library(lib).build();
//!
//! let backend = DefaultBackend;
//! let mut ctx = ResolutionContext::new(ResolverConfig::default(), &backend);
//! let output = ResolutionPass::run(&mut ctx, &program).unwrap();
//! assert!(output.is_ok());
//!
//! let a = ctx.lookup_class("A").unwrap();
//! let record = ctx.store().get(a);
//! assert_eq!(record.all_supertypes().unwrap().len(), 2); // A, Object
//! ```

pub mod context;
pub mod driver;
pub mod element;
pub mod linearize;
pub mod loader;
pub mod mixin;
pub mod resolver;
pub mod scope;
pub mod type_resolver;
pub mod types;

pub use context::{
    Backend, DefaultBackend, Library, MixinSharing, ResolutionContext, ResolverConfig,
};
pub use driver::{ResolutionOutput, ResolutionPass};
pub use element::{
    Capabilities, ClassKind, ClassRecord, ClassStore, Constructor, ConstructorKind,
    ConstructorOrigin, ConstructorRef, LoadState, ResolutionState, TypeParameter,
};
pub use linearize::{SupertypeSet, SupertypeSetBuilder};
pub use scope::{Binding, LibraryScope, LookupError};
pub use type_resolver::TypeExprResolver;
pub use types::{InstanceType, ResolvedType, TypeVariable};

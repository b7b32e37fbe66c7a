//! Shared leaf types for the Vela front end.
//!
//! This crate holds the types every other front-end crate agrees on:
//!
//! - [`Span`]: source positions for diagnostics
//! - [`ClassId`], [`LibraryId`]: stable ids for hierarchy records
//! - [`MessageKind`], [`Diagnostic`], [`Diagnostics`]: the closed diagnostic
//!   surface of the hierarchy resolver
//! - [`Feature`], [`FeatureLog`]: the backend feature-registration sink
//! - [`InternalError`]: fatal driver-contract violations

pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod registry;
pub mod span;

pub use diagnostics::{Diagnostic, Diagnostics, MessageKind};
pub use error::{InternalError, ResolveResult};
pub use ids::{ClassId, LibraryId};
pub use registry::{ConstructorError, Feature, FeatureLog};
pub use span::Span;

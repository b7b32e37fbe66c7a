//! Feature-registration sink consumed by backends.
//!
//! Hierarchy resolution can commit the compilation to runtime behavior a
//! backend must provision for (e.g. an erroneous synthesized constructor
//! throws no-such-method when invoked). Those commitments are recorded
//! here, alongside the compile-time errors attached to the constructors
//! that caused them, so later phases see both without re-running
//! resolution.

use crate::diagnostics::Diagnostic;
use crate::ids::ClassId;

/// A runtime feature the compiled program may exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Some synthesized constructor is erroneous and throws
    /// no-such-method when invoked.
    ThrowNoSuchMethod,
}

/// A compile-time error pinned to a synthesized constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorError {
    /// The class owning the synthesized constructor.
    pub class: ClassId,
    /// The diagnostic that made the constructor erroneous.
    pub diagnostic: Diagnostic,
}

/// Collector for feature registrations and constructor errors.
#[derive(Debug, Default)]
pub struct FeatureLog {
    features: Vec<Feature>,
    constructor_errors: Vec<ConstructorError>,
}

impl FeatureLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a feature, once.
    pub fn register_feature(&mut self, feature: Feature) {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
    }

    /// Attach a compile-time error to a class's synthesized constructor.
    pub fn register_constructor_error(&mut self, class: ClassId, diagnostic: Diagnostic) {
        self.constructor_errors.push(ConstructorError { class, diagnostic });
    }

    /// Whether a feature was registered.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// All registered features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// All constructor errors, in registration order.
    pub fn constructor_errors(&self) -> &[ConstructorError] {
        &self.constructor_errors
    }
}

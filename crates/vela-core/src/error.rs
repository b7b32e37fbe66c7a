//! Fatal internal errors.
//!
//! User-visible problems are diagnostics (see [`crate::diagnostics`]); the
//! variants here are driver-contract violations. Hitting one means the
//! surrounding compiler misused the resolver, not that the input program is
//! wrong, so they propagate as `Result` and abort the run.

use thiserror::Error;

use crate::ids::ClassId;

/// A violated invariant of the resolution driver contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A class id does not name a record in the store.
    #[error("unknown class id {0}")]
    UnknownClass(ClassId),

    /// The class resolver was invoked on a class not in the started state.
    #[error("{0} resolved out of order (expected state `started`)")]
    NotStarted(ClassId),

    /// A set-once field was written twice.
    #[error("{class}: field `{field}` set twice")]
    SetTwice {
        /// The class whose record was mutated.
        class: ClassId,
        /// The set-once field name.
        field: &'static str,
    },
}

impl InternalError {
    /// Shorthand for a [`InternalError::SetTwice`] violation.
    pub fn set_twice(class: ClassId, field: &'static str) -> Self {
        Self::SetTwice { class, field }
    }
}

/// Result alias for driver-facing resolver operations.
pub type ResolveResult<T> = Result<T, InternalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let e = InternalError::UnknownClass(ClassId::new(9));
        assert_eq!(e.to_string(), "unknown class id class#9");

        let e = InternalError::set_twice(ClassId::new(1), "supertype");
        assert_eq!(e.to_string(), "class#1: field `supertype` set twice");
    }
}

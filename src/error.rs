//! Error types for the tidesync reconciliation engine.
//!
//! The engine is pure and total over well-formed input, so the taxonomy is
//! narrow: precondition violations detected while reconciling collections,
//! and payload-construction failures at the apply boundary (an unknown
//! value where a concrete one is required, or a remote call rejected by
//! the control plane).

use thiserror::Error;

/// The main error type for tidesync operations.
#[derive(Debug, Error)]
pub enum TidesyncError {
    /// Reconciliation-engine precondition violations.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Apply-boundary errors.
    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),
}

/// Precondition violations detected by the reconciliation engine.
///
/// These indicate a defect in the caller-supplied collections, not a
/// transient condition; the current pass is aborted with a diagnostic
/// naming the offending entity.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two entities in one input collection share a content hash.
    #[error("Duplicate entity in {collection} collection: {entity}")]
    DuplicateContentHash {
        /// Collection the duplicate was found in.
        collection: String,
        /// Description of the offending entity.
        entity: String,
    },

    /// Two entities in one input collection claim the same identity slot.
    #[error("Duplicate identity in {collection} collection: {identity}")]
    DuplicateIdentityKey {
        /// Collection the duplicate was found in.
        collection: String,
        /// The colliding identity key.
        identity: String,
    },
}

/// Errors raised while building or executing wire requests.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A field needed for the request is not yet known.
    ///
    /// This is the expected, recoverable case where one resource's output
    /// feeds another's not-yet-applied input; the operation is deferred to
    /// the next pass rather than failed.
    #[error("Value for {field} is not yet known; operation deferred")]
    Unresolved {
        /// The field whose value is unresolved.
        field: String,
    },

    /// A field required for the request is absent from the configuration.
    #[error("Required field {field} is absent")]
    MissingField {
        /// The absent field.
        field: String,
    },

    /// The request body could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The control plane rejected an operation.
    #[error("Remote {operation} failed: {message}")]
    Remote {
        /// The operation that failed (e.g. "create grant").
        operation: String,
        /// Error message surfaced by the client.
        message: String,
    },
}

/// Result type alias for tidesync operations.
pub type Result<T> = std::result::Result<T, TidesyncError>;

impl TidesyncError {
    /// Returns true if the failed operation should be deferred to the next
    /// reconciliation pass instead of aborting the run.
    #[must_use]
    pub const fn is_deferrable(&self) -> bool {
        matches!(self, Self::Apply(ApplyError::Unresolved { .. }))
    }
}

impl ApplyError {
    /// Creates an unresolved-value error for the named field.
    #[must_use]
    pub fn unresolved(field: impl Into<String>) -> Self {
        Self::Unresolved {
            field: field.into(),
        }
    }

    /// Creates a remote-failure error.
    #[must_use]
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_is_deferrable() {
        let err = TidesyncError::Apply(ApplyError::unresolved("subject_id"));
        assert!(err.is_deferrable());
    }

    #[test]
    fn test_precondition_is_not_deferrable() {
        let err = TidesyncError::Engine(EngineError::DuplicateContentHash {
            collection: String::from("grants"),
            entity: String::from("user:ext-42 role=admin"),
        });
        assert!(!err.is_deferrable());
    }
}

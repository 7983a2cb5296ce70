//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Expected run-time outcomes (a blocked grid cell, an unknown display
/// number) are not errors; they surface as `bool` or `Option` results.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// Invalid input to a domain operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A lifecycle operation was invoked in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A numeric parameter fell outside its permitted range.
    #[error("{what} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the parameter.
        what: &'static str,
        /// The rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

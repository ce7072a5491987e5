//! Engine error taxonomy.

use questline_storage::StorageError;

/// Error type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the completion engine, the recurrence scanner and the
/// CRUD services. Every rejection happens before any write; `Internal`
/// wraps unexpected storage failures with the cause preserved.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No valid caller identity
    #[error("unauthenticated")]
    Unauthenticated,

    /// Missing or malformed input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity exists but belongs to another user
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Operation is not valid in the entity's current state
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Unexpected storage failure
    #[error("internal storage error")]
    Internal(#[from] StorageError),
}

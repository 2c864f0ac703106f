//! Domain-level errors for the ouroboros trajectory engine.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the pipeline that have nothing to do with I/O.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("rating {0} out of range [0,1]")]
    RatingOutOfRange(f64),

    #[error("experience not found: {0}")]
    ExperienceNotFound(Uuid),

    #[error("trajectory not found for user: {0}")]
    TrajectoryNotFound(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result alias used throughout the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

//! Error types for archgate operations.
//!
//! Every failure of a review action is detected before any write, so an
//! `Err` from the workflow always means the review, its checks and its audit
//! trail are exactly as they were before the call.

use crate::domain::{ActorRole, ReviewAction, ReviewId, ReviewStatus};
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for archgate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The action is not legal from the review's current status.
    #[error("Cannot apply {action} to review {review_id}: review is {status}")]
    InvalidTransition {
        /// The review the action targeted.
        review_id: ReviewId,
        /// The status the review was in.
        status: ReviewStatus,
        /// The rejected action.
        action: ReviewAction,
    },

    /// The actor/role pair does not satisfy the action's guard.
    #[error("Permission denied: {actor} ({role}) may not apply {action} to review {review_id}")]
    PermissionDenied {
        /// Actor name.
        actor: String,
        /// Role the actor presented.
        role: ActorRole,
        /// The review the action targeted.
        review_id: ReviewId,
        /// The rejected action.
        action: ReviewAction,
    },

    /// Review not found.
    #[error("Review not found: {0}")]
    ReviewNotFound(ReviewId),

    /// A review with this id already exists.
    #[error("Review already exists: {0}")]
    ReviewAlreadyExists(ReviewId),

    /// Malformed review or rule input, or a rule that could not be evaluated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another action committed against the review after it was read.
    #[error(
        "Concurrent modification of review {review_id}: expected version {expected}, found {found}"
    )]
    ConcurrentModification {
        /// The contested review.
        review_id: ReviewId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// Storage-layer error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No unique review id could be generated.
    #[error(transparent)]
    IdGeneration(#[from] IdGenerationError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSONL read/write failure.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] archgate_jsonl::Error),

    /// Record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catalog file is not valid YAML for the expected shape.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.archgate/` directory found.
    #[error("Not an archgate workspace (or any parent up to the filesystem root)")]
    NotInitialized,

    /// `.archgate/` already exists.
    #[error("Archgate is already initialized in {0}")]
    AlreadyInitialized(String),

    /// YAML could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value parsed but is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        /// The offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<archgate_jsonl::Error> for Error {
    fn from(e: archgate_jsonl::Error) -> Self {
        Error::Storage(StorageError::Jsonl(e))
    }
}

/// Coarse classification used by a service layer to pick a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Action illegal from the current status.
    InvalidTransition,
    /// Guard not satisfied.
    PermissionDenied,
    /// Unknown review.
    NotFound,
    /// Bad input.
    Validation,
    /// Lost a race or duplicate create.
    Conflict,
    /// Storage, config or IO failure.
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status code.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidTransition | ErrorKind::Conflict => 409,
            ErrorKind::PermissionDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 422,
            ErrorKind::Internal => 500,
        }
    }
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::ReviewNotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::ReviewAlreadyExists(_) | Error::ConcurrentModification { .. } => {
                ErrorKind::Conflict
            }
            Error::Storage(_) | Error::Config(_) | Error::IdGeneration(_) | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// A specialized Result type for archgate operations.
pub type Result<T> = std::result::Result<T, Error>;

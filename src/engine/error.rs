//! Error types for scheduling operations.
//!
//! Validation errors abort before any persistence. Per-match scheduling
//! failures are NOT errors: they are data (`SchedulingFailure`), returned
//! alongside the successfully scheduled matches, because a partial schedule
//! is a normal, actionable outcome.

use crate::db::repository::RepositoryError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A precondition was violated: too few teams, wrong tournament phase,
    /// malformed availability spec, bracket size over the configured
    /// maximum. Surfaced to the caller before anything is persisted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal invariant is broken (e.g. a bracket pairing table is
    /// missing for a computed size). A bug, not a user-facing condition.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The persistence layer failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

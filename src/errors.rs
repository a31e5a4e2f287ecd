use sea_orm::error::DbErr;
use sea_orm::SqlErr;

/// Error type shared by every service in the core.
///
/// Callers distinguish terminal business-rule failures (`ValidationError`,
/// `InsufficientStock`, `InvalidOperation`), missing aggregates (`NotFound`)
/// and retryable races (`ConcurrencyConflict`). Everything is raised
/// synchronously; no operation partially commits.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Wraps a database error without attempting conflict classification.
    pub fn db_error(error: DbErr) -> Self {
        ServiceError::DatabaseError(error)
    }

    /// Classifies a database error raised on a contended path.
    ///
    /// Serialization failures, deadlocks, lock timeouts and unique-key races
    /// become `ConcurrencyConflict` so the caller can retry the whole
    /// enclosing operation; anything else stays a `DatabaseError`.
    pub fn conflict_or_db(error: DbErr) -> Self {
        if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return ServiceError::ConcurrencyConflict(error.to_string());
        }
        let text = error.to_string();
        let lowered = text.to_lowercase();
        let conflict = text.contains("40001")
            || lowered.contains("could not serialize")
            || lowered.contains("serialization failure")
            || lowered.contains("deadlock")
            || lowered.contains("lock timeout")
            || lowered.contains("database is locked");
        if conflict {
            ServiceError::ConcurrencyConflict(text)
        } else {
            ServiceError::DatabaseError(error)
        }
    }

    /// Whether retrying the enclosing business operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::ConcurrencyConflict(_))
    }
}

//! Domain errors for the fieldflow workflow engine.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while driving a project's lifecycle.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No project with this id exists
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Required extra data is absent or blank
    #[error("Missing required fields: {}", .fields.join(", "))]
    ValidationFailed {
        /// Names of the missing fields
        fields: Vec<String>,
    },

    /// The installation date has not been reached
    #[error("Installation is scheduled for {blocking_date}; it cannot be completed before that date")]
    PreconditionFailed {
        /// Earliest day the move is allowed
        blocking_date: NaiveDate,
    },

    /// The record changed since it was read
    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict {
        /// Kind of record
        entity: String,
        /// Record identifier
        id: String,
    },

    /// The store rejected or failed a read or write
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored value could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// Build a validation error naming the given missing fields.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ValidationFailed {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

use thiserror::Error;

/// Unified error type for every adapter operation.
///
/// Driver failures are folded into `DatabaseError` at the session boundary,
/// so callers only ever match on the adapter taxonomy.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A database session could not be reached or established.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server or its driver rejected a statement.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The adapter was driven through an illegal state transition.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// A recognized failure raised outside the database itself.
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Anything that has not been classified yet.
    #[error("Other adapter error: {0}")]
    Other(String),
}

impl AdapterError {
    /// Whether a fresh connection attempt may still succeed.
    ///
    /// Only connection-level failures qualify. Server-reported errors carry a
    /// SQLSTATE, and retrying those would just repeat the rejection.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdapterError::ConnectionError(_))
    }
}

impl From<tokio_postgres::Error> for AdapterError {
    /// Statement-context mapping: once a session exists, anything the driver
    /// reports is a database-level failure.
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => AdapterError::DatabaseError(db.to_string()),
            None => AdapterError::DatabaseError(err.to_string()),
        }
    }
}

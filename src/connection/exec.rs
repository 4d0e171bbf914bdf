use tracing::debug;

use super::Connection;
use crate::error::AdapterError;
use crate::response::AdapterResponse;
use crate::results::ResultSet;
use crate::session::QueryOutcome;

impl Connection {
    /// Run one statement through the error-translation path.
    ///
    /// # Errors
    /// See [`Connection::execute`] for how failures are classified.
    pub async fn add_query(&mut self, sql: &str) -> Result<QueryOutcome, AdapterError> {
        let result = self.session_mut()?.query(sql).await;
        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.translate_error(sql, e).await),
        }
    }

    /// Run one statement and shape its outcome for callers: a response with
    /// a normalized status code, plus the rows when `fetch` is set.
    ///
    /// # Errors
    /// `AdapterError::DatabaseError` for server rejections, after rolling
    /// back any open transaction. Unclassified failures come back as
    /// `AdapterError::RuntimeError`; the remaining kinds are re-raised
    /// unchanged.
    pub async fn execute(
        &mut self,
        sql: &str,
        fetch: bool,
    ) -> Result<(AdapterResponse, ResultSet), AdapterError> {
        let outcome = self.add_query(sql).await?;
        let response = AdapterResponse::from_outcome(&outcome);
        let rows = if fetch {
            outcome.rows
        } else {
            ResultSet::default()
        };
        Ok((response, rows))
    }

    // Two paths. A server error rolls back with secondary failures swallowed
    // and surfaces trimmed; anything else logs the SQL, rolls back with
    // secondary failures propagated, and is re-raised.
    async fn translate_error(&mut self, sql: &str, error: AdapterError) -> AdapterError {
        match error {
            AdapterError::DatabaseError(message) => {
                debug!(connection = %self.name, error = %message, "database error");
                if let Err(rollback_error) = self.rollback_if_open().await {
                    debug!(
                        connection = %self.name,
                        error = %rollback_error,
                        "failed to release connection"
                    );
                }
                AdapterError::DatabaseError(message.trim().to_string())
            }
            other => {
                debug!(connection = %self.name, sql, "error running SQL");
                debug!(connection = %self.name, "rolling back transaction");
                if let Err(rollback_error) = self.rollback_if_open().await {
                    return rollback_error;
                }
                match other {
                    AdapterError::Other(message) => AdapterError::RuntimeError(message),
                    recognized => recognized,
                }
            }
        }
    }
}

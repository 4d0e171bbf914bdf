use tracing::debug;

use super::Connection;
use crate::error::AdapterError;

impl Connection {
    /// Start a transaction.
    ///
    /// # Errors
    /// `AdapterError::InternalError` when a transaction is already open;
    /// otherwise whatever sending `BEGIN` surfaces.
    pub async fn begin(&mut self) -> Result<(), AdapterError> {
        if self.transaction_open {
            return Err(AdapterError::InternalError(format!(
                "tried to begin a new transaction on connection \"{}\", but it already had one open",
                self.name
            )));
        }
        if self.credentials.enable_transaction {
            // The engine sometimes reports a transaction as already active on
            // a session that never opened one. Committing first clears that
            // phantom state; with nothing to commit, a rejection here is
            // expected and swallowed.
            if let Err(e) = self.add_query("COMMIT").await {
                debug!(connection = %self.name, error = %e, "pre-begin commit was rejected");
            }
            self.add_query("BEGIN").await?;
        }
        self.transaction_open = true;
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// # Errors
    /// `AdapterError::InternalError` when no transaction is open; otherwise
    /// whatever sending `COMMIT` surfaces.
    pub async fn commit(&mut self) -> Result<(), AdapterError> {
        if !self.transaction_open {
            return Err(AdapterError::InternalError(format!(
                "tried to commit transaction on connection \"{}\", but it does not have one open",
                self.name
            )));
        }
        if self.credentials.enable_transaction {
            debug!(connection = %self.name, "committing transaction");
            self.add_query("COMMIT").await?;
        }
        self.transaction_open = false;
        Ok(())
    }

    /// Roll back if a transaction is open, a no-op otherwise. The open flag
    /// is cleared only when the rollback went through.
    ///
    /// # Errors
    /// Propagates the failure when the `ROLLBACK` itself is rejected.
    pub async fn rollback_if_open(&mut self) -> Result<(), AdapterError> {
        if self.transaction_open {
            // Straight to the session, not through the statement path: this
            // runs inside error translation and must not recurse into it.
            self.session_mut()?.query("ROLLBACK").await?;
            self.transaction_open = false;
        }
        Ok(())
    }
}

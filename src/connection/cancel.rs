use tracing::debug;

use super::{BackendRef, Connection};

impl Connection {
    /// Ask the server to terminate another connection's backend.
    ///
    /// Best effort: the engine may not support `pg_terminate_backend`, and
    /// a target that already finished is not a problem worth surfacing.
    /// Every failure is logged at debug level and swallowed.
    pub async fn cancel(&mut self, target: &BackendRef) {
        let Some(pid) = target.pid else {
            debug!(connection = %target.name, "connection was already closed");
            return;
        };

        debug!(connection = %target.name, pid, "cancelling query");
        match self
            .add_query(&format!("select pg_terminate_backend({pid})"))
            .await
        {
            Ok(outcome) => {
                let result = outcome
                    .rows
                    .results
                    .first()
                    .and_then(|row| row.get_by_index(0));
                debug!(connection = %target.name, result = ?result, "cancel query result");
            }
            Err(e) => {
                debug!(connection = %target.name, error = %e, "cancel attempt failed");
            }
        }
    }
}

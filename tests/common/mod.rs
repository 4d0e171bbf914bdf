#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use yugabyte_adapter::Connection;
use yugabyte_adapter::error::AdapterError;
use yugabyte_adapter::results::{ResultSet, RowValues};
use yugabyte_adapter::session::{QueryOutcome, SqlSession};

/// Shared record of every statement a mock session executed, still
/// inspectable after the session has moved into a connection.
#[derive(Clone, Default)]
pub struct SessionLog(Arc<Mutex<Vec<String>>>);

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, sql: &str) {
        self.0.lock().unwrap().push(sql.to_string());
    }

    pub fn recorded(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Drain the log, returning what was recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

pub type Responder = Box<dyn FnMut(&str) -> Result<QueryOutcome, AdapterError> + Send>;

/// Scripted stand-in for a live session.
pub struct MockSession {
    log: SessionLog,
    pid: Option<i32>,
    respond: Responder,
}

impl MockSession {
    /// Every statement succeeds with an empty outcome.
    pub fn ok(log: SessionLog) -> Self {
        Self::with_responder(log, |sql| Ok(outcome_for(sql)))
    }

    pub fn with_responder(
        log: SessionLog,
        respond: impl FnMut(&str) -> Result<QueryOutcome, AdapterError> + Send + 'static,
    ) -> Self {
        Self {
            log,
            pid: Some(4242),
            respond: Box::new(respond),
        }
    }

    pub fn with_pid(mut self, pid: Option<i32>) -> Self {
        self.pid = pid;
        self
    }
}

#[async_trait]
impl SqlSession for MockSession {
    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, AdapterError> {
        self.log.push(sql);
        (self.respond)(sql)
    }

    fn backend_pid(&self) -> Option<i32> {
        self.pid
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// The outcome a session would report for `sql`, minus any rows.
pub fn outcome_for(sql: &str) -> QueryOutcome {
    let verb = sql
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    QueryOutcome {
        status: verb,
        rows_affected: 0,
        rows: ResultSet::default(),
    }
}

/// An outcome carrying exactly one row with one value.
pub fn single_value_outcome(status: &str, value: RowValues) -> QueryOutcome {
    let mut rows = ResultSet::with_capacity(1);
    rows.set_column_names(Arc::new(vec!["value".to_string()]));
    rows.add_row_values(vec![value]);
    QueryOutcome {
        status: status.to_string(),
        rows_affected: 1,
        rows,
    }
}

/// Open `connection` with the given session; panics if the retry loop asks
/// the factory for a second one.
pub async fn open_with_session(connection: &mut Connection, session: MockSession) {
    let mut slot = Some(session);
    connection
        .open_with(move || {
            let session = slot.take();
            async move {
                Ok(Box::new(session.expect("factory called more than once")) as Box<dyn SqlSession>)
            }
        })
        .await
        .expect("open mock session");
}

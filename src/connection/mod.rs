//! Connection lifecycle: opening with retry, transaction state, statement
//! execution, and advisory cancellation.

mod cancel;
mod exec;
mod retry;
mod tx;

pub use retry::{exponential_backoff, retry_connection};

use std::future::Future;

use tracing::debug;

use crate::credentials::Credentials;
use crate::error::AdapterError;
use crate::session::{PgSession, SqlSession};

/// Lifecycle state of a named connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Names a connection's server-side process. Cheap to clone and safe to
/// hand to another worker for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRef {
    /// The adapter-side connection name.
    pub name: String,
    /// Server-side pid; None once the connection is closed.
    pub pid: Option<i32>,
}

/// A named connection owned by exactly one worker at a time.
///
/// Peers never share the handle itself. Cross-worker cancellation goes
/// through a [`BackendRef`] snapshot instead.
pub struct Connection {
    name: String,
    credentials: Credentials,
    state: ConnectionState,
    transaction_open: bool,
    handle: Option<Box<dyn SqlSession>>,
}

impl Connection {
    #[must_use]
    pub fn new(name: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            name: name.into(),
            credentials,
            state: ConnectionState::Closed,
            transaction_open: false,
            handle: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Whether a transaction is currently open. Only ever true while the
    /// connection itself is open.
    #[must_use]
    pub fn transaction_open(&self) -> bool {
        self.transaction_open
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Snapshot the server-side identity for cross-worker cancellation.
    #[must_use]
    pub fn backend_ref(&self) -> BackendRef {
        BackendRef {
            name: self.name.clone(),
            pid: self.handle.as_ref().and_then(|session| session.backend_pid()),
        }
    }

    /// Open the connection with the bundled tokio-postgres transport,
    /// retrying transient failures with quadratic backoff. Opening an
    /// already-open connection is a logged no-op.
    ///
    /// # Errors
    /// Returns the final connect error once the retry budget is spent, or
    /// immediately for non-retryable failures.
    pub async fn open(&mut self) -> Result<(), AdapterError> {
        let credentials = self.credentials.clone();
        self.open_with(move || {
            let credentials = credentials.clone();
            async move {
                let session = PgSession::connect(&credentials).await?;
                Ok(Box::new(session) as Box<dyn SqlSession>)
            }
        })
        .await
    }

    /// Open with a custom session factory, for TLS transports or tests.
    /// Retry behavior matches [`Connection::open`].
    ///
    /// # Errors
    /// Returns the final connect error once the retry budget is spent, or
    /// immediately for non-retryable failures.
    pub async fn open_with<F, Fut>(&mut self, connect: F) -> Result<(), AdapterError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Box<dyn SqlSession>, AdapterError>>,
    {
        if self.is_open() {
            debug!(connection = %self.name, "connection is already open, skipping open");
            return Ok(());
        }
        let session = retry::retry_connection(
            &self.name,
            connect,
            self.credentials.retries,
            retry::exponential_backoff,
        )
        .await?;
        self.handle = Some(session);
        self.state = ConnectionState::Open;
        Ok(())
    }

    /// Close the connection, rolling back any open transaction first.
    /// Idempotent; failures along the way are logged, and the handle is
    /// released regardless.
    pub async fn close(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.rollback_if_open().await {
                debug!(connection = %self.name, error = %e, "rollback during close failed");
            }
            if let Some(mut session) = self.handle.take() {
                if let Err(e) = session.close().await {
                    debug!(connection = %self.name, error = %e, "session close failed");
                }
            }
        }
        self.transaction_open = false;
        self.state = ConnectionState::Closed;
    }

    fn session_mut(&mut self) -> Result<&mut dyn SqlSession, AdapterError> {
        match &mut self.handle {
            Some(session) => Ok(session.as_mut()),
            None => Err(AdapterError::InternalError(format!(
                "tried to use connection \"{}\", but it is closed",
                self.name
            ))),
        }
    }
}

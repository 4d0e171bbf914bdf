use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use tokio_postgres::{Client, NoTls, Statement};
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::AdapterError;
use crate::results::{ResultSet, RowValues};

/// What one executed statement produced.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    /// Status line in command-tag form, e.g. `SELECT 2`.
    pub status: String,
    /// Rows touched or returned.
    pub rows_affected: u64,
    /// Result rows, empty for statements that return none.
    pub rows: ResultSet,
}

/// One live database session.
///
/// The adapter drives everything through this seam, so transaction and
/// retry behavior can be exercised without a running server.
#[async_trait]
pub trait SqlSession: Send {
    /// Execute a single SQL statement and collect its outcome.
    ///
    /// # Errors
    /// Returns `AdapterError::DatabaseError` when the server or driver
    /// rejects the statement.
    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, AdapterError>;

    /// Server-side process id of this session, when known.
    fn backend_pid(&self) -> Option<i32>;

    /// Tear the session down. Dropping without closing is also safe; this
    /// just waits for the socket to wind down.
    ///
    /// # Errors
    /// Propagates teardown failures from the driver.
    async fn close(&mut self) -> Result<(), AdapterError>;
}

/// `SqlSession` backed by tokio-postgres.
///
/// The connection task is spawned onto the current runtime. The session
/// stays in autocommit; transactions are issued as explicit statements by
/// the owning connection.
pub struct PgSession {
    client: Option<Client>,
    driver: tokio::task::JoinHandle<()>,
    backend_pid: Option<i32>,
}

impl PgSession {
    /// Connect with the default TLS-less transport.
    ///
    /// # Errors
    /// Returns `AdapterError::ConnectionError` when the server cannot be
    /// reached and `AdapterError::DatabaseError` when it answers with a
    /// rejection.
    pub async fn connect(credentials: &Credentials) -> Result<Self, AdapterError> {
        let config = credentials.pg_config()?;
        let (client, connection) = config.connect(NoTls).await.map_err(classify_connect_error)?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "connection task ended with error");
            }
        });

        let mut session = PgSession {
            client: Some(client),
            driver,
            backend_pid: None,
        };
        if let Some(role) = credentials.role.as_deref().filter(|role| !role.is_empty()) {
            session.query(&format!("set role {role}")).await?;
        }
        session.backend_pid = session.resolve_backend_pid().await;
        Ok(session)
    }

    // Snapshotted once at connect time; the driver has no accessor for it.
    async fn resolve_backend_pid(&mut self) -> Option<i32> {
        match self.query("select pg_backend_pid()").await {
            Ok(outcome) => outcome
                .rows
                .results
                .first()
                .and_then(|row| row.get_by_index(0))
                .and_then(RowValues::as_int)
                .and_then(|pid| i32::try_from(pid).ok()),
            Err(e) => {
                debug!(error = %e, "could not resolve backend pid");
                None
            }
        }
    }

    fn client(&self) -> Result<&Client, AdapterError> {
        self.client
            .as_ref()
            .ok_or_else(|| AdapterError::ConnectionError("session is closed".to_string()))
    }
}

#[async_trait]
impl SqlSession for PgSession {
    async fn query(&mut self, sql: &str) -> Result<QueryOutcome, AdapterError> {
        let client = self.client()?;
        let stmt = client.prepare(sql).await?;
        if stmt.columns().is_empty() {
            let rows_affected = client.execute(&stmt, &[]).await?;
            Ok(QueryOutcome {
                status: status_line(sql, rows_affected),
                rows_affected,
                rows: ResultSet::default(),
            })
        } else {
            let rows = client.query(&stmt, &[]).await?;
            let rows_affected = rows.len() as u64;
            Ok(QueryOutcome {
                status: status_line(sql, rows_affected),
                rows_affected,
                rows: result_set_from_rows(&stmt, &rows)?,
            })
        }
    }

    fn backend_pid(&self) -> Option<i32> {
        self.backend_pid
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        if self.client.take().is_some() {
            // Dropping the client closes the socket; wait for the connection
            // task to drain.
            let _ = (&mut self.driver).await;
        }
        Ok(())
    }
}

/// Split connect-time failures into retryable connection trouble and
/// definitive server rejections.
fn classify_connect_error(err: tokio_postgres::Error) -> AdapterError {
    match err.as_db_error() {
        Some(db) => AdapterError::DatabaseError(db.to_string().trim().to_string()),
        None => AdapterError::ConnectionError(err.to_string()),
    }
}

/// Reconstruct a command-tag style status line. The driver does not expose
/// the server's tag, so the statement verb and row count stand in for it.
fn status_line(sql: &str, rows_affected: u64) -> String {
    let verb = sql
        .split_whitespace()
        .next()
        .map(str::to_ascii_uppercase)
        .unwrap_or_default();
    match verb.as_str() {
        "SELECT" | "INSERT" | "UPDATE" | "DELETE" => format!("{verb} {rows_affected}"),
        _ => verb,
    }
}

fn result_set_from_rows(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, AdapterError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(decode_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Decode one column into a `RowValues`, falling back to text for types
/// without a dedicated variant.
fn decode_value(row: &tokio_postgres::Row, idx: usize) -> Result<RowValues, AdapterError> {
    let type_name = row.columns()[idx].type_().name();
    match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Int))
        }
        "oid" => {
            let val: Option<u32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bool))
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Timestamp))
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc())))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::JSON))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Blob))
        }
        _ => {
            // text, varchar, name, bpchar, and anything else that can read
            // back as a string
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Text))
        }
    }
}

//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::column::Column;
pub use crate::connection::{
    BackendRef, Connection, ConnectionState, exponential_backoff, retry_connection,
};
pub use crate::credentials::{Credentials, SessionOptions};
pub use crate::error::AdapterError;
pub use crate::relation::{Relation, RelationType};
pub use crate::relation_configs::{
    ChangeAction, IndexConfig, IndexConfigChange, MAX_CHARACTERS_IN_IDENTIFIER,
    MaterializedViewConfig, MaterializedViewConfigChangeCollection,
};
pub use crate::response::AdapterResponse;
pub use crate::results::{ResultSet, Row, RowValues};
pub use crate::session::{PgSession, QueryOutcome, SqlSession};

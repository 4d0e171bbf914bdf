pub mod column;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod prelude;
pub mod relation;
pub mod relation_configs;
pub mod response;
pub mod results;
pub mod session;

pub use connection::{
    BackendRef, Connection, ConnectionState, exponential_backoff, retry_connection,
};
pub use credentials::{Credentials, SessionOptions};
pub use error::AdapterError;
pub use response::AdapterResponse;
pub use results::{ResultSet, Row, RowValues};
pub use session::{PgSession, QueryOutcome, SqlSession};

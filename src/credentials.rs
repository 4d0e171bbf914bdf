use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio_postgres::config::SslMode;

use crate::error::AdapterError;

/// Profile settings for one YugabyteDB target.
///
/// Field names follow the profile file format; `dbname` and `pass` are
/// accepted as aliases for `database` and `password`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    #[serde(alias = "pass")]
    pub password: String,
    pub port: u16,
    #[serde(alias = "dbname")]
    pub database: String,
    pub schema: String,
    /// Connect timeout in seconds. Zero disables the timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub search_path: Option<String>,
    /// TCP keepalive idle time in seconds. Zero leaves the platform default.
    #[serde(default)]
    pub keepalives_idle: u64,
    #[serde(default)]
    pub sslmode: Option<String>,
    #[serde(default)]
    pub sslcert: Option<String>,
    #[serde(default)]
    pub sslkey: Option<String>,
    #[serde(default)]
    pub sslrootcert: Option<String>,
    #[serde(default = "default_application_name")]
    pub application_name: Option<String>,
    /// How many times a failed connection attempt is retried.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// When false, begin/commit only track state and send no statements.
    #[serde(default = "default_enable_transaction")]
    pub enable_transaction: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_application_name() -> Option<String> {
    Some("dbt".to_string())
}

fn default_retries() -> u32 {
    1
}

fn default_enable_transaction() -> bool {
    true
}

impl Default for Credentials {
    /// Defaults for a stock local single-node install.
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "yugabyte".to_string(),
            password: String::new(),
            port: 5433,
            database: "yugabyte".to_string(),
            schema: "public".to_string(),
            connect_timeout: default_connect_timeout(),
            role: None,
            search_path: None,
            keepalives_idle: 0,
            sslmode: None,
            sslcert: None,
            sslkey: None,
            sslrootcert: None,
            application_name: default_application_name(),
            retries: default_retries(),
            enable_transaction: default_enable_transaction(),
        }
    }
}

impl fmt::Debug for Credentials {
    // The password never reaches logs or debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("connect_timeout", &self.connect_timeout)
            .field("role", &self.role)
            .field("search_path", &self.search_path)
            .field("keepalives_idle", &self.keepalives_idle)
            .field("sslmode", &self.sslmode)
            .field("application_name", &self.application_name)
            .field("retries", &self.retries)
            .field("enable_transaction", &self.enable_transaction)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Build the driver configuration for these credentials.
    ///
    /// # Errors
    /// Returns `AdapterError::ConnectionError` if a required field is empty
    /// or the sslmode value is not recognized.
    pub fn pg_config(&self) -> Result<tokio_postgres::Config, AdapterError> {
        if self.database.is_empty() {
            return Err(AdapterError::ConnectionError(
                "dbname is required".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(AdapterError::ConnectionError("host is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(AdapterError::ConnectionError("user is required".to_string()));
        }

        let mut config = tokio_postgres::Config::new();
        config
            .dbname(&self.database)
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password);
        if self.connect_timeout > 0 {
            config.connect_timeout(Duration::from_secs(self.connect_timeout));
        }
        SessionOptions::from_credentials(self).apply(&mut config)?;
        Ok(config)
    }
}

/// The session-level settings derived from credentials, separated from the
/// base connection fields so they can be inspected and tested on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// TCP keepalive idle time; absent means platform default.
    pub keepalives_idle: Option<Duration>,
    /// Server options string, e.g. `-c search_path=...`.
    pub options: Option<String>,
    /// Name reported in `pg_stat_activity`.
    pub application_name: Option<String>,
    /// Requested sslmode, still in profile spelling.
    pub sslmode: Option<String>,
    /// Client certificate path, for session factories that build TLS.
    pub sslcert: Option<PathBuf>,
    /// Client key path, for session factories that build TLS.
    pub sslkey: Option<PathBuf>,
    /// Root certificate path, for session factories that build TLS.
    pub sslrootcert: Option<PathBuf>,
}

impl SessionOptions {
    #[must_use]
    pub fn from_credentials(credentials: &Credentials) -> Self {
        // A zero keepalive must be left out entirely. Forwarding it configures
        // the socket with a zero idle time, which the server side rejects.
        let keepalives_idle = (credentials.keepalives_idle > 0)
            .then(|| Duration::from_secs(credentials.keepalives_idle));
        let options = credentials
            .search_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("-c search_path={}", path.replace(' ', "\\ ")));
        let application_name = credentials
            .application_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);
        Self {
            keepalives_idle,
            options,
            application_name,
            sslmode: credentials.sslmode.clone(),
            sslcert: credentials.sslcert.as_deref().map(PathBuf::from),
            sslkey: credentials.sslkey.as_deref().map(PathBuf::from),
            sslrootcert: credentials.sslrootcert.as_deref().map(PathBuf::from),
        }
    }

    /// Apply these options to a driver configuration.
    ///
    /// Certificate paths are not consumed here; they are inputs for custom
    /// session factories that bring their own TLS connector.
    ///
    /// # Errors
    /// Returns `AdapterError::ConnectionError` for an unrecognized sslmode.
    pub fn apply(&self, config: &mut tokio_postgres::Config) -> Result<(), AdapterError> {
        if let Some(idle) = self.keepalives_idle {
            config.keepalives_idle(idle);
        }
        if let Some(options) = &self.options {
            config.options(options);
        }
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        if let Some(mode) = &self.sslmode {
            config.ssl_mode(parse_ssl_mode(mode)?);
        }
        Ok(())
    }
}

fn parse_ssl_mode(mode: &str) -> Result<SslMode, AdapterError> {
    match mode {
        "disable" => Ok(SslMode::Disable),
        "allow" | "prefer" => Ok(SslMode::Prefer),
        // verify-ca and verify-full additionally need a TLS connector from
        // the session factory; at the config level they all request TLS.
        "require" | "verify-ca" | "verify-full" => Ok(SslMode::Require),
        other => Err(AdapterError::ConnectionError(format!(
            "invalid sslmode value: {other}"
        ))),
    }
}

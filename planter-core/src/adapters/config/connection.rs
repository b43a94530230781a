//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// Upper bound for pool size, connect timeout and statement timeout overrides
const MAX_CONNECTIONS_LIMIT: u32 = 100;
const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for introspecting one database.
///
/// Introspection issues a handful of catalog queries per table, so the pool
/// stays small and every session is read-only by default.
///
/// # Example
/// ```rust
/// use planter_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("shop".to_string())
///     .with_username("planter".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Optional port number
    pub port: Option<u16>,
    /// Optional database name
    pub database: Option<String>,
    /// Optional username (password handled separately)
    pub username: Option<String>,
    /// Timeout for establishing a connection and acquiring it from the pool
    pub connect_timeout: Duration,
    /// Per-statement timeout applied to every session
    pub query_timeout: Duration,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Whether sessions default to read-only transactions
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            max_connections: 4,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        if let Some(database) = &self.database {
            write!(f, "/{}", database)?;
        }
        // Username is left out on purpose, credentials never reach logs
        Ok(())
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Applies a recognized URL query parameter.
    ///
    /// Out-of-range or malformed values are ignored and the default is kept.
    /// Returns `true` when the parameter was recognized.
    pub fn apply_query_parameter(&mut self, key: &str, value: &str) -> bool {
        match key {
            "connect_timeout" => {
                if let Ok(secs) = value.parse::<u64>()
                    && secs > 0
                    && Duration::from_secs(secs) <= MAX_TIMEOUT
                {
                    self.connect_timeout = Duration::from_secs(secs);
                }
                true
            }
            "statement_timeout" => {
                if let Ok(ms) = value.parse::<u64>()
                    && ms > 0
                    && Duration::from_millis(ms) <= MAX_TIMEOUT
                {
                    self.query_timeout = Duration::from_millis(ms);
                }
                true
            }
            "pool_max_conns" => {
                if let Ok(max) = value.parse::<u32>()
                    && max > 0
                    && max <= MAX_CONNECTIONS_LIMIT
                {
                    self.max_connections = max;
                }
                true
            }
            _ => false,
        }
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::PlanterError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == Some(0) {
            return Err(crate::error::PlanterError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.max_connections == 0 || self.max_connections > MAX_CONNECTIONS_LIMIT {
            return Err(crate::error::PlanterError::configuration(format!(
                "max_connections must be between 1 and {}",
                MAX_CONNECTIONS_LIMIT
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::PlanterError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_zero() {
            return Err(crate::error::PlanterError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

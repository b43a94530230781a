//! PostgreSQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Applies read-only session settings to every pooled connection
//! - Never logs or stores credentials

use super::{ConnectionConfig, PostgresAdapter};
use crate::adapters::config::DEFAULT_PORT;
use crate::adapters::redact_database_url;
use crate::{Result, error::PlanterError};
use sqlx::PgPool;
use url::Url;

/// PostgreSQL identifier length limit (NAMEDATALEN - 1)
const MAX_IDENTIFIER_LEN: usize = 63;

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter.
    ///
    /// The pool connects lazily, so an unreachable server is reported by the
    /// first query rather than here.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or unsafe
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = Self::parse_connection_config(connection_string)?;
        Self::with_config(connection_string, config).await
    }

    /// Creates a new PostgreSQL adapter with custom configuration.
    ///
    /// # Errors
    /// Returns error if the configuration or connection string is invalid
    #[allow(clippy::unused_async)]
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Self::validate_connection_string(connection_string)?;

        let pool = Self::create_connection_pool(connection_string, &config)?;
        tracing::debug!("Created PostgreSQL pool for {}", config);

        Ok(Self { pool, config })
    }

    /// Closes the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Parses connection string to extract configuration parameters.
    ///
    /// Recognized query parameters: `connect_timeout` (seconds),
    /// `statement_timeout` (milliseconds) and `pool_max_conns`.
    ///
    /// # Errors
    /// Returns error if connection string is malformed or contains unsafe parameters
    pub fn parse_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
        Self::validate_connection_string(connection_string)?;

        let url = Url::parse(connection_string).map_err(|e| {
            PlanterError::configuration(format!(
                "Invalid PostgreSQL connection string format: {}",
                e
            ))
        })?;

        let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string())
            .with_port(url.port().unwrap_or(DEFAULT_PORT));

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            if database.len() > MAX_IDENTIFIER_LEN {
                return Err(PlanterError::configuration(format!(
                    "Database name too long: maximum {} characters",
                    MAX_IDENTIFIER_LEN
                )));
            }
            config = config.with_database(database.to_string());
        }

        let username = url.username();
        if !username.is_empty() {
            if username.len() > MAX_IDENTIFIER_LEN {
                return Err(PlanterError::configuration(format!(
                    "Username too long: maximum {} characters",
                    MAX_IDENTIFIER_LEN
                )));
            }
            config = config.with_username(username.to_string());
        }

        for (key, value) in url.query_pairs() {
            config.apply_query_parameter(&key, &value);
        }

        config.validate()?;
        Ok(config)
    }

    /// Creates a lazily connecting pool.
    ///
    /// Every new connection runs the session settings below before it is
    /// handed out:
    /// - `statement_timeout` from the configuration
    /// - `default_transaction_read_only` when read-only mode is on
    /// - `application_name` for connection tracking
    /// - UTC time zone
    pub(crate) fn create_connection_pool(
        connection_string: &str,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let statement_timeout_ms = config.query_timeout.as_millis();
        let read_only = config.read_only;

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET statement_timeout = {}", statement_timeout_ms).as_str(),
                    )
                    .await?;

                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }

                    let app_name = format!("planter-{}", env!("CARGO_PKG_VERSION"));
                    conn.execute(format!("SET application_name = '{}'", app_name).as_str())
                        .await?;

                    conn.execute("SET timezone = 'UTC'").await?;

                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| {
                PlanterError::collection_failed(
                    format!(
                        "Failed to create PostgreSQL connection pool to {}",
                        redact_database_url(connection_string)
                    ),
                    e,
                )
            })
    }

    /// Validates connection string format.
    ///
    /// # Errors
    /// Returns error if connection string is invalid or unsafe
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            PlanterError::configuration(format!(
                "Invalid PostgreSQL connection string format: {}",
                e
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(PlanterError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(PlanterError::configuration(
                "Connection string must specify a host",
            ));
        }

        Ok(())
    }

    /// Checks that the schema exists and the current role may read it.
    ///
    /// # Errors
    /// Returns [`PlanterError::InsufficientPrivileges`] when the schema is
    /// missing or lacks `USAGE` for the current role.
    pub(crate) async fn validate_schema_privileges(&self, schema: &str) -> Result<()> {
        let usable: Option<bool> = sqlx::query_scalar(
            "SELECT has_schema_privilege(n.oid, 'USAGE') \
             FROM pg_catalog.pg_namespace n WHERE n.nspname = $1",
        )
        .bind(schema)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| crate::adapters::helpers::catalog_query_error("pg_catalog.pg_namespace", e))?;

        match usable {
            Some(true) => Ok(()),
            Some(false) => Err(PlanterError::insufficient_privileges(format!(
                "USAGE on schema '{}'",
                schema
            ))),
            None => Err(PlanterError::configuration(format!(
                "Schema '{}' does not exist",
                schema
            ))),
        }
    }
}

//! PostgreSQL schema provider.
//!
//! # Module Structure
//! - `connection`: URL parsing, validation and the session-configured pool
//! - `schema_collection`: Catalog queries for tables, columns and keys
//!
//! # Security Guarantees
//! - All operations are read-only catalog queries
//! - Connection strings are sanitized in error messages
//! - Statement timeouts prevent runaway queries

mod connection;
mod schema_collection;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, SchemaProvider};
use crate::{Result, error::PlanterError, models::Table};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL schema provider backed by a lazily connecting pool
pub struct PostgresAdapter {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl SchemaProvider for PostgresAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(PlanterError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(PlanterError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn load_tables(&self, schema: &str) -> Result<Vec<Table>> {
        schema_collection::collect_tables(self, schema).await
    }

    fn provider_name(&self) -> &'static str {
        "postgresql"
    }
}

//! PostgreSQL catalog introspection.
//!
//! Reads `pg_catalog` directly rather than `information_schema` so that
//! display types come from `format_type` and key column order comes from the
//! constraint definition.

use super::PostgresAdapter;
use crate::Result;
use crate::adapters::helpers::{RowExt, catalog_query_error};
use crate::error::PlanterError;
use crate::models::{Column, ForeignKey, PrimaryKey, Table};

const TABLES_QUERY: &str = r#"
    SELECT
        c.relname::text AS table_name,
        obj_description(c.oid, 'pg_class') AS table_comment
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1
    AND c.relkind IN ('r', 'p')
    AND NOT c.relispartition
    ORDER BY c.relname
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        a.attname::text AS column_name,
        pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
        a.attnotnull AS not_null,
        a.attnum::integer AS ordinal_position,
        col_description(a.attrelid, a.attnum) AS column_comment
    FROM pg_catalog.pg_attribute a
    JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1
    AND c.relname = $2
    AND a.attnum > 0
    AND NOT a.attisdropped
    ORDER BY a.attnum
"#;

const PRIMARY_KEY_QUERY: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        array_agg(a.attname::text ORDER BY k.ord) AS columns
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
    JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
    WHERE con.contype = 'p'
    AND n.nspname = $1
    AND c.relname = $2
    GROUP BY con.conname
"#;

// Constraint OIDs grow with creation time, which keeps relation lines in the
// order the foreign keys were declared.
const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        fns.nspname::text AS referenced_schema,
        fcl.relname::text AS referenced_table,
        array_agg(a.attname::text ORDER BY k.ord) AS columns,
        array_agg(fa.attname::text ORDER BY k.ord) AS referenced_columns
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class cl ON cl.oid = con.conrelid
    JOIN pg_catalog.pg_namespace ns ON ns.oid = cl.relnamespace
    JOIN pg_catalog.pg_class fcl ON fcl.oid = con.confrelid
    JOIN pg_catalog.pg_namespace fns ON fns.oid = fcl.relnamespace
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, fattnum, ord)
    JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
    JOIN pg_catalog.pg_attribute fa ON fa.attrelid = con.confrelid AND fa.attnum = k.fattnum
    WHERE con.contype = 'f'
    AND ns.nspname = $1
    AND cl.relname = $2
    GROUP BY con.oid, con.conname, fns.nspname, fcl.relname
    ORDER BY con.oid
"#;

/// Loads every base table of `schema`, ordered by name.
pub(crate) async fn collect_tables(adapter: &PostgresAdapter, schema: &str) -> Result<Vec<Table>> {
    let start_time = std::time::Instant::now();
    tracing::info!(
        "Starting PostgreSQL schema collection for schema '{}' on {}",
        schema,
        adapter.config
    );

    adapter.validate_schema_privileges(schema).await?;

    let table_rows = sqlx::query(TABLES_QUERY)
        .bind(schema)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to enumerate tables: {}", e);
            catalog_query_error("pg_catalog.pg_class", e)
        })?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        let table_name: String = row.get_field("table_name", None)?;
        let comment: Option<String> = row.get_field("table_comment", Some(&table_name))?;

        let columns = adapter.collect_table_columns(schema, &table_name).await?;
        let primary_key = adapter.collect_table_primary_key(schema, &table_name).await?;
        let foreign_keys = adapter.collect_table_foreign_keys(schema, &table_name).await?;

        let table = Table {
            name: table_name,
            schema: Some(schema.to_string()),
            columns,
            primary_key,
            foreign_keys,
            comment,
        };

        tracing::debug!(
            "Collected table '{}' with {} columns, {} foreign keys",
            table.name,
            table.columns.len(),
            table.foreign_keys.len()
        );
        tables.push(table);
    }

    tracing::info!(
        "PostgreSQL schema collection completed in {:.2}s - found {} tables",
        start_time.elapsed().as_secs_f64(),
        tables.len()
    );

    Ok(tables)
}

impl PostgresAdapter {
    /// Collects column metadata for a specific table in physical order
    pub(crate) async fn collect_table_columns(
        &self,
        schema: &str,
        table_name: &str,
    ) -> Result<Vec<Column>> {
        let column_rows = sqlx::query(COLUMNS_QUERY)
            .bind(schema)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PlanterError::collection_failed(
                    format!(
                        "Failed to collect columns for table '{}.{}'",
                        schema, table_name
                    ),
                    e,
                )
            })?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let name: String = row.get_field("column_name", Some(table_name))?;
            let data_type: String = row.get_field("data_type", Some(table_name))?;
            let not_null: bool = row.get_field("not_null", Some(table_name))?;
            let ordinal_position: i32 = row.get_field("ordinal_position", Some(table_name))?;
            let comment: Option<String> = row.get_field("column_comment", Some(table_name))?;

            let ordinal_position = u32::try_from(ordinal_position).map_err(|_| {
                PlanterError::invalid_schema(
                    table_name,
                    format!("column '{}' has a negative position", name),
                )
            })?;

            columns.push(Column {
                name,
                data_type,
                is_nullable: !not_null,
                ordinal_position,
                comment,
            });
        }

        Ok(columns)
    }

    /// Collects the primary key for a specific table, columns in key order
    pub(crate) async fn collect_table_primary_key(
        &self,
        schema: &str,
        table_name: &str,
    ) -> Result<Option<PrimaryKey>> {
        let pk_row = sqlx::query(PRIMARY_KEY_QUERY)
            .bind(schema)
            .bind(table_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                PlanterError::collection_failed(
                    format!(
                        "Failed to collect primary key for table '{}.{}'",
                        schema, table_name
                    ),
                    e,
                )
            })?;

        let Some(row) = pk_row else {
            return Ok(None);
        };

        let name: Option<String> = row.get_field("constraint_name", Some(table_name))?;
        let columns: Vec<String> = row.get_field("columns", Some(table_name))?;
        Ok(Some(PrimaryKey { name, columns }))
    }

    /// Collects foreign keys for a specific table in declaration order
    pub(crate) async fn collect_table_foreign_keys(
        &self,
        schema: &str,
        table_name: &str,
    ) -> Result<Vec<ForeignKey>> {
        let fk_rows = sqlx::query(FOREIGN_KEYS_QUERY)
            .bind(schema)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                PlanterError::collection_failed(
                    format!(
                        "Failed to collect foreign keys for table '{}.{}'",
                        schema, table_name
                    ),
                    e,
                )
            })?;

        let mut foreign_keys = Vec::with_capacity(fk_rows.len());
        for row in &fk_rows {
            let name: Option<String> = row.get_field("constraint_name", Some(table_name))?;
            let referenced_schema: Option<String> =
                row.get_field("referenced_schema", Some(table_name))?;
            // Same-schema references carry no schema, matching the model
            let referenced_schema = referenced_schema.filter(|s| s != schema);
            let referenced_table: String = row.get_field("referenced_table", Some(table_name))?;
            let columns: Vec<String> = row.get_field("columns", Some(table_name))?;
            let referenced_columns: Vec<String> =
                row.get_field("referenced_columns", Some(table_name))?;

            foreign_keys.push(ForeignKey {
                name,
                columns,
                referenced_table,
                referenced_schema,
                referenced_columns,
            });
        }

        Ok(foreign_keys)
    }
}

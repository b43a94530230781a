//! Row extraction and error mapping shared by the SQL adapters.

use crate::{Result, error::PlanterError};
use sqlx::{Row, postgres::PgRow};

/// SQLSTATE for `insufficient_privilege`
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Extension trait for extracting typed values from database rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use planter_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("users"))?;
/// let comment: Option<String> = row.get_field("column_comment", Some("users"))?;
/// ```
pub(crate) trait RowExt {
    /// Extracts a typed field, naming the field and table in the error.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| PlanterError::parse_field(field_name, table_context, e))
    }
}

/// Maps a catalog query failure, turning permission errors into
/// [`PlanterError::InsufficientPrivileges`].
pub(crate) fn catalog_query_error(resource: &str, error: sqlx::Error) -> PlanterError {
    match &error {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) =>
        {
            PlanterError::insufficient_privileges(format!(
                "Cannot access {} - insufficient privileges",
                resource
            ))
        }
        _ => PlanterError::collection_failed(format!("Failed to query {}", resource), error),
    }
}

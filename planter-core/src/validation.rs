//! Consistency checks run on the selected tables before rendering.
//!
//! The renderers assume a well-formed model. Anything that would make the
//! diagram ambiguous or refer to columns that do not exist is rejected here
//! with [`PlanterError::InvalidSchema`], so the pipeline fails closed and no
//! partial document is emitted.
//!
//! A foreign key whose referenced table is not part of the selection is not an
//! error: the relation renderer drops it.

use crate::error::PlanterError;
use crate::models::{ForeignKey, Table};
use crate::Result;
use std::collections::{HashMap, HashSet};

/// Validates every table of one rendering pass.
///
/// # Errors
/// Returns the first inconsistency found, labeled with the offending table.
pub fn validate_tables(tables: &[Table]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tables.len());
    for table in tables {
        if !seen.insert(table.name.as_str()) {
            return Err(PlanterError::invalid_schema(
                &table.name,
                "table name appears more than once",
            ));
        }
    }

    let by_name: HashMap<&str, &Table> = tables.iter().map(|t| (t.name.as_str(), t)).collect();

    for table in tables {
        validate_table(table)?;
        for fk in &table.foreign_keys {
            validate_foreign_key(table, fk, &by_name)?;
        }
    }

    tracing::debug!("Validated {} tables", tables.len());
    Ok(())
}

/// Validates the columns and primary key of a single table.
///
/// # Errors
/// Fails on duplicate ordinal positions, duplicate column names, or a primary
/// key naming a column the table does not have.
pub fn validate_table(table: &Table) -> Result<()> {
    let mut ordinals = HashSet::with_capacity(table.columns.len());
    let mut names = HashSet::with_capacity(table.columns.len());

    for column in &table.columns {
        if !ordinals.insert(column.ordinal_position) {
            return Err(PlanterError::invalid_schema(
                &table.name,
                format!(
                    "duplicate ordinal position {} (column '{}')",
                    column.ordinal_position, column.name
                ),
            ));
        }
        if !names.insert(column.name.as_str()) {
            return Err(PlanterError::invalid_schema(
                &table.name,
                format!("duplicate column name '{}'", column.name),
            ));
        }
    }

    for key_column in table.primary_key_columns() {
        if !names.contains(key_column.as_str()) {
            return Err(PlanterError::invalid_schema(
                &table.name,
                format!("primary key references unknown column '{}'", key_column),
            ));
        }
    }

    Ok(())
}

fn validate_foreign_key(
    table: &Table,
    fk: &ForeignKey,
    by_name: &HashMap<&str, &Table>,
) -> Result<()> {
    let label = fk.name.as_deref().unwrap_or("<unnamed>");

    if fk.columns.is_empty() || fk.columns.len() != fk.referenced_columns.len() {
        return Err(PlanterError::invalid_schema(
            &table.name,
            format!(
                "foreign key {} maps {} columns onto {} referenced columns",
                label,
                fk.columns.len(),
                fk.referenced_columns.len()
            ),
        ));
    }

    if let Some(missing) = fk.columns.iter().find(|c| table.column(c).is_none()) {
        return Err(PlanterError::invalid_schema(
            &table.name,
            format!("foreign key {} uses unknown column '{}'", label, missing),
        ));
    }

    // Only checkable when the target survived selection
    if let Some(target) = by_name.get(fk.referenced_table.as_str())
        && references_same_schema(fk, target)
        && let Some(missing) = fk
            .referenced_columns
            .iter()
            .find(|c| target.column(c).is_none())
    {
        return Err(PlanterError::invalid_schema(
            &table.name,
            format!(
                "foreign key {} references unknown column '{}.{}'",
                label, fk.referenced_table, missing
            ),
        ));
    }

    Ok(())
}

/// Checks whether `target` is the table a foreign key points at, taking the
/// referenced schema into account when both sides know theirs.
pub(crate) fn references_same_schema(fk: &ForeignKey, target: &Table) -> bool {
    match (fk.referenced_schema.as_deref(), target.schema.as_deref()) {
        (Some(referenced), Some(actual)) => referenced == actual,
        _ => true,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("name", "text", true, 2))
            .with_primary_key(["id"])
    }

    fn orders() -> Table {
        Table::new("orders")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("user_id", "integer", false, 2))
            .with_primary_key(["id"])
            .with_foreign_key(ForeignKey::new(["user_id"], "users", ["id"]))
    }

    fn reason(result: Result<()>) -> String {
        match result {
            Err(PlanterError::InvalidSchema { reason, .. }) => reason,
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        assert!(validate_tables(&[users(), orders()]).is_ok());
        assert!(validate_tables(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_table_names_rejected() {
        let result = validate_tables(&[users(), users()]);
        assert!(reason(result).contains("more than once"));
    }

    #[test]
    fn test_duplicate_ordinal_rejected() {
        let table = users().with_column(Column::new("email", "text", true, 2));
        assert!(reason(validate_table(&table)).contains("duplicate ordinal position 2"));
    }

    #[test]
    fn test_duplicate_column_name_rejected() {
        let table = users().with_column(Column::new("name", "text", true, 3));
        assert!(reason(validate_table(&table)).contains("duplicate column name 'name'"));
    }

    #[test]
    fn test_primary_key_unknown_column_rejected() {
        let table = users().with_primary_key(["uuid"]);
        assert!(reason(validate_table(&table)).contains("unknown column 'uuid'"));
    }

    #[test]
    fn test_foreign_key_unknown_source_column_rejected() {
        let table = orders().with_foreign_key(ForeignKey::new(["customer_id"], "users", ["id"]));
        assert!(reason(validate_tables(&[users(), table])).contains("'customer_id'"));
    }

    #[test]
    fn test_foreign_key_arity_mismatch_rejected() {
        let mut table = orders();
        table.foreign_keys[0].referenced_columns.push("name".to_string());
        assert!(reason(validate_tables(&[users(), table])).contains("maps 1 columns onto 2"));
    }

    #[test]
    fn test_foreign_key_unknown_referenced_column_rejected() {
        let table = orders().with_foreign_key(ForeignKey::new(["user_id"], "users", ["uuid"]));
        assert!(reason(validate_tables(&[users(), table])).contains("'users.uuid'"));
    }

    #[test]
    fn test_foreign_key_to_absent_table_is_not_an_error() {
        assert!(validate_tables(&[orders()]).is_ok());
    }

    #[test]
    fn test_references_same_schema() {
        let target = users().with_schema("public");
        let local = ForeignKey::new(["user_id"], "users", ["id"]);
        let remote = ForeignKey::new(["user_id"], "users", ["id"]).with_referenced_schema("auth");

        assert!(references_same_schema(&local, &target));
        assert!(!references_same_schema(&remote, &target));
        assert!(references_same_schema(&remote, &users()));
    }
}

//! Schema model consumed by the diagram renderers.
//!
//! These are passive values produced by a schema provider. They carry no
//! rendering logic; column order is the physical `ordinal_position` order
//! reported by the database and is preserved end to end.

use serde::{Deserialize, Serialize};

/// Database column information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type as a display string, e.g. `character varying(255)`
    pub data_type: String,
    pub is_nullable: bool,
    pub ordinal_position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Primary key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Foreign key constraint.
///
/// The source side is the [`Table`] owning the key; `columns[i]` references
/// `referenced_columns[i]`. Cardinality is always many rows of the source to
/// one row of the referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: String,
    /// `None` when the referenced table lives in the same schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_schema: Option<String>,
    pub referenced_columns: Vec<String>,
}

/// Database table information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Column {
    /// Creates a column at the given ordinal position
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: bool,
        ordinal_position: u32,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable,
            ordinal_position,
            comment: None,
        }
    }
}

impl ForeignKey {
    /// Creates an unnamed foreign key referencing a table in the same schema
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        referenced_table: impl Into<String>,
        referenced_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_schema: None,
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder method to set the constraint name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the referenced schema.
    pub fn with_referenced_schema(mut self, schema: impl Into<String>) -> Self {
        self.referenced_schema = Some(schema.into());
        self
    }
}

impl Table {
    /// Creates an empty table with no columns or keys
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            comment: None,
        }
    }

    /// Builder method to set the owning schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method to append a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder method to set the primary key columns.
    pub fn with_primary_key<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.primary_key = Some(PrimaryKey {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Builder method to append a foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Primary key column names, empty when the table has no primary key
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key
            .as_ref()
            .map(|pk| pk.columns.as_slice())
            .unwrap_or_default()
    }

    /// Checks if a column is part of the primary key
    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.primary_key_columns().iter().any(|c| c == column)
    }

    /// Checks if a column participates in any foreign key of this table
    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.columns.iter().any(|c| c == column))
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns sorted by ordinal position
    pub fn columns_in_order(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.ordinal_position);
        columns
    }
}

//! Table to PlantUML `entity` block.

use super::escape::{EntityIds, escape_label};
use crate::error::PlanterError;
use crate::models::{Column, Table};
use crate::validation::validate_table;
use crate::Result;
use std::fmt;

/// One column line of an entity block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub data_type: String,
    /// NOT NULL column
    pub mandatory: bool,
    pub primary_key: bool,
    pub foreign_key: bool,
}

/// An entity block: key columns first, then the remaining columns,
/// each group in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub label: String,
    pub keys: Vec<Attribute>,
    pub attributes: Vec<Attribute>,
}

impl Attribute {
    fn from_column(table: &Table, column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            mandatory: !column.is_nullable,
            primary_key: table.is_primary_key_column(&column.name),
            foreign_key: table.is_foreign_key_column(&column.name),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("  ")?;
        if self.mandatory {
            f.write_str("* ")?;
        }
        write!(
            f,
            "{} : {}",
            escape_label(&self.name),
            escape_label(&self.data_type)
        )?;
        if self.primary_key {
            f.write_str(" <<PK>>")?;
        }
        if self.foreign_key {
            f.write_str(" <<FK>>")?;
        }
        f.write_str("\n")
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "entity \"{}\" as {} {{", escape_label(&self.label), self.id)?;
        for key in &self.keys {
            write!(f, "{key}")?;
        }
        if !self.keys.is_empty() && !self.attributes.is_empty() {
            f.write_str("  --\n")?;
        }
        for attribute in &self.attributes {
            write!(f, "{attribute}")?;
        }
        f.write_str("}\n")
    }
}

/// Builds the entity for one table of a document.
///
/// The table must already have passed [`validate_table`].
///
/// # Errors
/// Fails if the table was not assigned an identifier in `ids`.
pub fn build_entity(table: &Table, ids: &EntityIds) -> Result<Entity> {
    let id = ids.get(&table.name).ok_or_else(|| {
        PlanterError::invalid_schema(&table.name, "table is not part of this diagram")
    })?;

    let (keys, attributes): (Vec<Attribute>, Vec<Attribute>) = table
        .columns_in_order()
        .into_iter()
        .map(|column| Attribute::from_column(table, column))
        .partition(|attribute| attribute.primary_key);

    Ok(Entity {
        id: id.to_string(),
        label: table.name.clone(),
        keys,
        attributes,
    })
}

/// Renders a single table as a standalone entity block.
///
/// # Errors
/// Fails if the table is inconsistent.
pub fn render_entity(table: &Table) -> Result<String> {
    validate_table(table)?;
    let ids = EntityIds::new(std::slice::from_ref(table));
    Ok(build_entity(table, &ids)?.to_string())
}

/// Renders the entity blocks of `tables` in order, separated by blank lines.
///
/// # Errors
/// Fails on the first inconsistent table; nothing is returned in that case.
pub fn render_entities(tables: &[Table], ids: &EntityIds) -> Result<String> {
    let entities = tables
        .iter()
        .map(|table| {
            validate_table(table)?;
            build_entity(table, ids)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(join_entities(&entities))
}

pub(crate) fn join_entities(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::ForeignKey;

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("name", "text", true, 2))
            .with_primary_key(["id"])
    }

    #[test]
    fn test_render_simple_entity() {
        let text = render_entity(&users()).unwrap();
        assert_eq!(
            text,
            "entity \"users\" as users {\n  * id : integer <<PK>>\n  --\n  name : text\n}\n"
        );
    }

    #[test]
    fn test_primary_key_columns_come_first() {
        let table = Table::new("memberships")
            .with_column(Column::new("note", "text", true, 1))
            .with_column(Column::new("group_id", "integer", false, 2))
            .with_column(Column::new("created_at", "timestamp", false, 3))
            .with_column(Column::new("user_id", "integer", false, 4))
            .with_primary_key(["user_id", "group_id"]);

        let entity = build_entity(&table, &EntityIds::new(std::slice::from_ref(&table))).unwrap();
        let keys: Vec<&str> = entity.keys.iter().map(|a| a.name.as_str()).collect();
        let rest: Vec<&str> = entity.attributes.iter().map(|a| a.name.as_str()).collect();

        // Within each group the physical column order wins, not key order
        assert_eq!(keys, ["group_id", "user_id"]);
        assert_eq!(rest, ["note", "created_at"]);
    }

    #[test]
    fn test_columns_follow_ordinal_position_not_vec_order() {
        let table = Table::new("t")
            .with_column(Column::new("c", "text", true, 3))
            .with_column(Column::new("a", "text", true, 1))
            .with_column(Column::new("b", "text", true, 2));

        let text = render_entity(&table).unwrap();
        let a = text.find("  a :").unwrap();
        let b = text.find("  b :").unwrap();
        let c = text.find("  c :").unwrap();
        assert!(a < b && b < c);
        assert!(!text.contains("--"));
    }

    #[test]
    fn test_foreign_key_marker() {
        let table = Table::new("orders")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("user_id", "integer", true, 2))
            .with_primary_key(["id"])
            .with_foreign_key(ForeignKey::new(["user_id"], "users", ["id"]));

        let text = render_entity(&table).unwrap();
        assert!(text.contains("  user_id : integer <<FK>>\n"));
    }

    #[test]
    fn test_key_only_entity_has_no_separator() {
        let table = Table::new("tags")
            .with_column(Column::new("tag", "text", false, 1))
            .with_primary_key(["tag"]);
        assert_eq!(
            render_entity(&table).unwrap(),
            "entity \"tags\" as tags {\n  * tag : text <<PK>>\n}\n"
        );
    }

    #[test]
    fn test_markup_in_names_is_escaped() {
        let table = Table::new("we\"ird}")
            .with_column(Column::new("}", "text", true, 1))
            .with_column(Column::new("x\ny", "my<type>", true, 2));

        let text = render_entity(&table).unwrap();
        assert!(text.starts_with("entity \"we<U+0022>ird<U+007D>\" as we_ird_ {\n"));
        assert!(text.contains("  <U+007D> : text\n"));
        assert!(text.contains("  x<U+000A>y : my<U+003C>type<U+003E>\n"));
        // Exactly one closing brace line and four lines in total
        assert_eq!(text.lines().filter(|l| *l == "}").count(), 1);
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_member_prefixes_in_column_names_are_kept_literal() {
        let table = Table::new("flags")
            .with_column(Column::new("+x", "text", true, 1))
            .with_column(Column::new("-y", "text", true, 2))
            .with_column(Column::new("#z", "text", true, 3));

        let text = render_entity(&table).unwrap();
        assert!(text.contains("  <U+002B>x : text\n"));
        assert!(text.contains("  <U+002D>y : text\n"));
        assert!(text.contains("  <U+0023>z : text\n"));
    }

    #[test]
    fn test_render_entities_rejects_inconsistent_table() {
        let broken = users().with_primary_key(["missing"]);
        let tables = [broken];
        assert!(matches!(
            render_entities(&tables, &EntityIds::new(&tables)),
            Err(PlanterError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_duplicate_ordinal_is_an_error() {
        let table = users().with_column(Column::new("email", "text", true, 2));
        assert!(matches!(
            render_entity(&table),
            Err(PlanterError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_table_outside_document_is_an_error() {
        let ids = EntityIds::new(&[Table::new("other")]);
        assert!(build_entity(&users(), &ids).is_err());
    }

    #[test]
    fn test_render_entities_separates_blocks() {
        let tables = [users(), Table::new("empty")];
        let text = render_entities(&tables, &EntityIds::new(&tables)).unwrap();
        assert!(text.contains("}\n\nentity \"empty\" as empty {\n}\n"));
    }
}

//! Foreign keys to PlantUML relation lines.
//!
//! One line per foreign key, grouped by source table in table order and by
//! declaration order within a table. Foreign keys whose referenced table is not
//! part of the document are dropped silently.

use super::escape::{EntityIds, escape_label};
use crate::models::Table;
use crate::validation::references_same_schema;
use std::collections::HashMap;
use std::fmt;

/// A many-to-one edge from the table owning a foreign key to the table it
/// references. Self references have `from == to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub from: String,
    pub to: String,
    /// Participating source columns
    pub columns: Vec<String>,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.from, self.to)?;
        if !self.columns.is_empty() {
            write!(f, " : {}", escape_label(&self.columns.join(", ")))?;
        }
        f.write_str("\n")
    }
}

/// Builds the relations between `tables`, using the entity identifiers of the
/// same document.
pub fn build_relations(tables: &[Table], ids: &EntityIds) -> Vec<Relation> {
    let by_name: HashMap<&str, &Table> = tables.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut relations = Vec::new();

    for table in tables {
        let Some(from) = ids.get(&table.name) else {
            continue;
        };

        for fk in &table.foreign_keys {
            let target = by_name
                .get(fk.referenced_table.as_str())
                .filter(|target| references_same_schema(fk, target));

            let Some(to) = target.and_then(|target| ids.get(&target.name)) else {
                tracing::debug!(
                    "Skipping foreign key {}.{:?} -> {}: referenced table not selected",
                    table.name,
                    fk.columns,
                    fk.referenced_table
                );
                continue;
            };

            relations.push(Relation {
                from: from.to_string(),
                to: to.to_string(),
                columns: fk.columns.clone(),
            });
        }
    }

    relations
}

/// Renders the relation block for `tables` as a standalone text block.
pub fn render_relations(tables: &[Table]) -> String {
    join_relations(&build_relations(tables, &EntityIds::new(tables)))
}

pub(crate) fn join_relations(relations: &[Relation]) -> String {
    relations.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ForeignKey};

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("manager_id", "integer", true, 2))
            .with_primary_key(["id"])
            .with_foreign_key(ForeignKey::new(["manager_id"], "users", ["id"]))
    }

    fn orders() -> Table {
        Table::new("orders")
            .with_column(Column::new("id", "integer", false, 1))
            .with_column(Column::new("buyer_id", "integer", false, 2))
            .with_column(Column::new("seller_id", "integer", false, 3))
            .with_primary_key(["id"])
            .with_foreign_key(ForeignKey::new(["seller_id"], "users", ["id"]))
            .with_foreign_key(ForeignKey::new(["buyer_id"], "users", ["id"]))
    }

    #[test]
    fn test_relation_line_format() {
        let relation = Relation {
            from: "orders".to_string(),
            to: "users".to_string(),
            columns: vec!["user_id".to_string()],
        };
        assert_eq!(relation.to_string(), "orders --> users : user_id\n");
    }

    #[test]
    fn test_composite_key_label() {
        let relation = Relation {
            from: "line_items".to_string(),
            to: "orders".to_string(),
            columns: vec!["order_id".to_string(), "order_rev".to_string()],
        };
        assert_eq!(
            relation.to_string(),
            "line_items --> orders : order_id, order_rev\n"
        );
    }

    #[test]
    fn test_each_foreign_key_is_its_own_edge_in_declaration_order() {
        let text = render_relations(&[users(), orders()]);
        assert_eq!(
            text,
            "users --> users : manager_id\n\
             orders --> users : seller_id\n\
             orders --> users : buyer_id\n"
        );
    }

    #[test]
    fn test_absent_target_is_dropped() {
        assert_eq!(render_relations(&[orders()]), "");
    }

    #[test]
    fn test_other_schema_target_is_dropped() {
        let audit = Table::new("events")
            .with_schema("public")
            .with_column(Column::new("user_id", "integer", false, 1))
            .with_foreign_key(
                ForeignKey::new(["user_id"], "users", ["id"]).with_referenced_schema("auth"),
            );
        let local_users = users().with_schema("public");

        let relations = build_relations(
            &[audit.clone(), local_users.clone()],
            &EntityIds::new(&[audit, local_users]),
        );
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].from, "users");
    }

    #[test]
    fn test_relations_use_entity_ids() {
        let weird = Table::new("order items")
            .with_column(Column::new("user_id", "integer", false, 1))
            .with_foreign_key(ForeignKey::new(["user_id"], "users", ["id"]));
        let text = render_relations(&[weird, users()]);
        assert!(text.starts_with("order_items --> users : user_id\n"));
    }

    #[test]
    fn test_label_is_escaped() {
        let relation = Relation {
            from: "a".to_string(),
            to: "b".to_string(),
            columns: vec!["x}\ny".to_string()],
        };
        assert_eq!(relation.to_string(), "a --> b : x<U+007D><U+000A>y\n");
    }
}

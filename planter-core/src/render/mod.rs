//! PlantUML entity-relationship diagram rendering.
//!
//! # Module Structure
//! - `escape`: label escaping and entity identifiers
//! - `entity`: table to `entity` block
//! - `relation`: foreign keys to relation lines
//! - `document`: header, layout directives and footer
//!
//! Renderers build typed blocks ([`Entity`], [`Relation`]) which are turned
//! into text once, when the [`Diagram`] is displayed. Rendering is pure: the
//! same tables and options always produce the same bytes.

mod document;
mod entity;
mod escape;
mod relation;

pub use document::{END_MARKER, LAYOUT_DIRECTIVES, START_MARKER, assemble, title_line};
pub use entity::{Attribute, Entity, build_entity, render_entities, render_entity};
pub use escape::{EntityIds, escape_label, sanitize_identifier};
pub use relation::{Relation, build_relations, render_relations};

use crate::filter::Selection;
use crate::models::Table;
use crate::validation::validate_tables;
use crate::Result;
use std::fmt;

/// Per-run diagram options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramOptions {
    /// Title line, omitted when `None` or empty
    pub title: Option<String>,
}

impl DiagramOptions {
    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A complete diagram before serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    /// Title text; line breaks are written as a literal `\n`
    pub title: Option<String>,
    /// Entity blocks in table order
    pub entities: Vec<Entity>,
    /// Relation lines in table then key declaration order
    pub relations: Vec<Relation>,
}

impl Diagram {
    /// Builds the diagram for an already selected table set.
    ///
    /// # Errors
    /// Fails closed with [`crate::PlanterError::InvalidSchema`] when any table
    /// is inconsistent.
    pub fn build(tables: &[Table], options: &DiagramOptions) -> Result<Self> {
        validate_tables(tables)?;

        let ids = EntityIds::new(tables);
        let entities = tables
            .iter()
            .map(|table| build_entity(table, &ids))
            .collect::<Result<Vec<_>>>()?;
        let relations = build_relations(tables, &ids);

        tracing::debug!(
            "Built diagram with {} entities and {} relations",
            entities.len(),
            relations.len()
        );

        Ok(Self {
            title: options.title.clone(),
            entities,
            relations,
        })
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entities = entity::join_entities(&self.entities);
        let relations = relation::join_relations(&self.relations);
        f.write_str(&assemble(self.title.as_deref(), &entities, &relations))
    }
}

/// Renders the selected tables into a PlantUML document.
///
/// # Errors
/// Returns an error instead of a partial document when the schema is
/// inconsistent.
pub fn render_diagram(tables: &[Table], options: &DiagramOptions) -> Result<String> {
    Ok(Diagram::build(tables, options)?.to_string())
}

/// Applies `selection` to the provider's tables and renders the result.
///
/// # Errors
/// See [`render_diagram`].
pub fn generate(tables: Vec<Table>, selection: &Selection, options: &DiagramOptions) -> Result<String> {
    let selected = selection.apply(tables);
    render_diagram(&selected, options)
}

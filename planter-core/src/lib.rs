//! Core library for Planter: relational schema metadata to PlantUML
//! entity-relationship diagrams.
//!
//! # Pipeline
//! 1. A [`SchemaProvider`] loads the tables of one schema (live PostgreSQL
//!    catalog or a JSON snapshot).
//! 2. A [`Selection`] keeps the requested tables.
//! 3. [`render_diagram`] validates the tables and renders entity blocks,
//!    relation lines and the document frame.
//!
//! Rendering is pure and deterministic. An inconsistent schema is rejected
//! with [`PlanterError::InvalidSchema`] instead of producing partial output.
//!
//! # Example
//! ```rust
//! use planter_core::{Column, DiagramOptions, Selection, Table, generate};
//!
//! let users = Table::new("users")
//!     .with_column(Column::new("id", "integer", false, 1))
//!     .with_primary_key(["id"]);
//!
//! let document = generate(vec![users], &Selection::all(), &DiagramOptions::default())?;
//! assert!(document.starts_with("@startuml\n"));
//! # Ok::<(), planter_core::PlanterError>(())
//! ```

pub mod adapters;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod render;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, SchemaProvider, create_provider};
pub use error::{PlanterError, Result};
pub use filter::{FilterMode, Selection, filter_tables, parse_table_list, read_table_list};
pub use models::{Column, ForeignKey, PrimaryKey, Table};
pub use render::{
    Diagram, DiagramOptions, generate, render_diagram, render_entities, render_entity,
    render_relations,
};
pub use snapshot::{SchemaSnapshot, SnapshotProvider, load_snapshot, save_snapshot};
pub use validation::{validate_table, validate_tables};

//! Table selection by inclusion and exclusion lists.
//!
//! Unknown names are ignored and an empty list never filters anything. The
//! canonical composition is include first, then exclude, so a name present in
//! both lists is excluded.

use crate::error::PlanterError;
use crate::models::Table;
use crate::Result;
use std::collections::HashSet;
use std::path::Path;

/// Whether a name list keeps or drops the tables it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep only the named tables
    Include,
    /// Drop the named tables
    Exclude,
}

/// Selects a subset of `tables` by name, preserving their relative order.
///
/// An empty `names` list returns the input unchanged in either mode.
pub fn filter_tables(tables: Vec<Table>, names: &[String], mode: FilterMode) -> Vec<Table> {
    if names.is_empty() {
        return tables;
    }

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let keep_named = mode == FilterMode::Include;

    tables
        .into_iter()
        .filter(|table| wanted.contains(table.name.as_str()) == keep_named)
        .collect()
}

/// Include and exclude lists applied as one selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Selection {
    /// Creates a selection that keeps every table
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder method to set the include list.
    pub fn with_include<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.include = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the exclude list.
    pub fn with_exclude<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    /// Applies include, then exclude.
    pub fn apply(&self, tables: Vec<Table>) -> Vec<Table> {
        let total = tables.len();
        let included = filter_tables(tables, &self.include, FilterMode::Include);
        let selected = filter_tables(included, &self.exclude, FilterMode::Exclude);

        tracing::debug!(
            "Selected {} of {} tables (include: {}, exclude: {})",
            selected.len(),
            total,
            self.include.len(),
            self.exclude.len()
        );

        selected
    }
}

/// Parses a module file body: one table name per line, blank lines dropped.
pub fn parse_table_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a module file listing the tables of one diagram.
///
/// # Errors
/// Returns an I/O error if the file cannot be read.
pub async fn read_table_list(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PlanterError::io(format!("Failed to read module file {}", path.display()), e))?;

    let names = parse_table_list(&contents);
    tracing::info!("Module file {} lists {} tables", path.display(), names.len());
    Ok(names)
}

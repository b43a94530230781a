//! JSON schema snapshots.
//!
//! A snapshot is the provider output for one schema written to disk, so a
//! diagram can be rendered again later without database access.

use crate::adapters::SchemaProvider;
use crate::error::PlanterError;
use crate::models::Table;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0";

/// Serialized provider output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Always [`SNAPSHOT_FORMAT_VERSION`] when written
    pub format_version: String,
    /// Schema the tables were loaded from
    pub schema: String,
    /// Tables in provider order
    pub tables: Vec<Table>,
}

impl SchemaSnapshot {
    /// Wraps `tables` loaded from `schema`.
    pub fn new(schema: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION.to_string(),
            schema: schema.into(),
            tables,
        }
    }
}

/// Writes a snapshot as pretty-printed JSON.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub async fn save_snapshot(snapshot: &SchemaSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|e| PlanterError::Serialization {
        context: "Failed to serialize schema snapshot".to_string(),
        source: e,
    })?;

    tokio::fs::write(path, json).await.map_err(|e| {
        PlanterError::io(format!("Failed to write snapshot {}", path.display()), e)
    })?;

    tracing::info!(
        "Saved {} tables of schema '{}' to {}",
        snapshot.tables.len(),
        snapshot.schema,
        path.display()
    );
    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`].
///
/// # Errors
/// Returns error if the file cannot be read, is not valid JSON, or has an
/// unsupported format version.
pub async fn load_snapshot(path: &Path) -> Result<SchemaSnapshot> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        PlanterError::io(format!("Failed to read snapshot {}", path.display()), e)
    })?;

    let snapshot: SchemaSnapshot =
        serde_json::from_str(&contents).map_err(|e| PlanterError::Serialization {
            context: format!("Failed to parse snapshot {}", path.display()),
            source: e,
        })?;

    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(PlanterError::configuration(format!(
            "Unsupported snapshot format version '{}' (expected '{}')",
            snapshot.format_version, SNAPSHOT_FORMAT_VERSION
        )));
    }

    Ok(snapshot)
}

/// Schema provider reading a JSON snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    /// Creates a provider for the snapshot at `path`. The file is not read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaProvider for SnapshotProvider {
    async fn test_connection(&self) -> Result<()> {
        tokio::fs::metadata(&self.path).await.map_err(|e| {
            PlanterError::io(format!("Cannot open snapshot {}", self.path.display()), e)
        })?;
        Ok(())
    }

    /// A snapshot holds exactly one schema; when it differs from the
    /// requested one the snapshot wins and a warning is logged.
    async fn load_tables(&self, schema: &str) -> Result<Vec<Table>> {
        let snapshot = load_snapshot(&self.path).await?;
        if snapshot.schema != schema {
            tracing::warn!(
                "Snapshot {} holds schema '{}', ignoring requested schema '{}'",
                self.path.display(),
                snapshot.schema,
                schema
            );
        }
        tracing::debug!(
            "Loaded {} tables from snapshot {}",
            snapshot.tables.len(),
            self.path.display()
        );
        Ok(snapshot.tables)
    }

    fn provider_name(&self) -> &'static str {
        "snapshot"
    }
}

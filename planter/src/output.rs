//! Writing the rendered document.
//!
//! The document is complete before anything is written. Files are written to
//! a temporary file in the destination directory and persisted atomically, so
//! a failure never leaves a truncated diagram behind.

use planter_core::{PlanterError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where the document goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for OutputTarget {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes `document` to `target`.
///
/// # Errors
/// Returns an I/O error if the document cannot be written in full.
pub fn write_document(document: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => write_stdout(document),
        OutputTarget::File(path) => write_atomic(document, path),
    }
}

fn write_stdout(document: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(document.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| PlanterError::io("Failed to write diagram to stdout", e))
}

fn write_atomic(document: &str, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        PlanterError::io(
            format!("Failed to create temporary file in {}", dir.display()),
            e,
        )
    })?;

    file.write_all(document.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| {
            PlanterError::io(format!("Failed to write diagram for {}", path.display()), e)
        })?;

    file.persist(path).map_err(|e| {
        PlanterError::io(format!("Failed to write {}", path.display()), e.error)
    })?;

    Ok(())
}

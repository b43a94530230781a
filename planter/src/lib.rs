//! Command-line surface of the `planter` binary.
//!
//! Argument parsing and output handling live here so they can be tested
//! without spawning the binary; `main.rs` wires them to the core pipeline.

pub mod output;

use clap::{Args, Parser};
use planter_core::{DiagramOptions, Result, Selection, read_table_list};
use std::path::PathBuf;

pub use output::{OutputTarget, write_document};

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "planter")]
#[command(about = "Generate PlantUML entity-relationship diagrams from a database schema")]
#[command(version)]
#[command(long_about = "
Planter - PlantUML ER diagrams from relational schema metadata

Reads tables, columns, primary keys and foreign keys of one schema and writes
a PlantUML document with one entity per table and one relation per foreign
key. The database is only read, never modified.

SOURCES:
- PostgreSQL (postgres:// or postgresql://)
- Schema snapshot (.json, written with --dump-schema)

EXAMPLES:
  planter postgres://user@localhost/shop -o shop.puml
  planter postgres://localhost/shop -t users,orders -T 'Ordering'
  planter postgres://localhost/shop --dump-schema shop.json
  planter shop.json -x audit_log
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Schema source
    #[arg(
        env = "DATABASE_URL",
        value_name = "SOURCE",
        help = "PostgreSQL URL or schema snapshot file (credentials are redacted in logs)"
    )]
    pub source: String,

    /// Database schema
    #[arg(short, long, default_value = "public", help = "Database schema to read")]
    pub schema: String,

    /// Diagram title
    #[arg(short = 'T', long, help = "Diagram title")]
    pub title: Option<String>,

    /// Output file path
    #[arg(short, long, value_name = "FILE", help = "Output file (default: stdout)")]
    pub output: Option<PathBuf>,

    /// Module file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "File listing the tables to include, one per line (replaces --table)"
    )]
    pub module: Option<PathBuf>,

    /// Tables to include
    #[arg(
        short,
        long = "table",
        value_name = "NAME",
        value_delimiter = ',',
        help = "Table to include (repeatable, comma separated)"
    )]
    pub tables: Vec<String>,

    /// Tables to exclude
    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "NAME",
        value_delimiter = ',',
        help = "Table to exclude (repeatable, comma separated)"
    )]
    pub excludes: Vec<String>,

    /// Snapshot output
    #[arg(
        long,
        value_name = "FILE",
        help = "Also write the loaded tables as a JSON snapshot"
    )]
    pub dump_schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all logs except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Builds the table selection.
    ///
    /// A module file, when given, replaces the `--table` list.
    ///
    /// # Errors
    /// Returns an I/O error if the module file cannot be read.
    pub async fn selection(&self) -> Result<Selection> {
        let include = match &self.module {
            Some(path) => {
                if !self.tables.is_empty() {
                    tracing::warn!(
                        "Module file {} replaces {} --table names",
                        path.display(),
                        self.tables.len()
                    );
                }
                read_table_list(path).await?
            }
            None => clean_names(&self.tables),
        };

        Ok(Selection::all()
            .with_include(include)
            .with_exclude(clean_names(&self.excludes)))
    }

    pub fn diagram_options(&self) -> DiagramOptions {
        DiagramOptions {
            title: self.title.clone(),
        }
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget::from(self.output.clone())
    }
}

fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

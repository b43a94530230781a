//! PlantUML ER diagram generator.
//!
//! Loads one schema from PostgreSQL or a snapshot, selects tables and writes
//! the rendered document to a file or stdout.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - No credentials stored or logged

use clap::Parser;
use planter::{Cli, OutputTarget, write_document};
use planter_core::{
    Result, SchemaSnapshot, create_provider, error::redact_database_url, generate,
    logging::init_logging, save_snapshot,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    run(&cli).await.map_err(|e| {
        error!("{}", e);
        e
    })
}

/// Loads, selects, renders and writes one diagram.
async fn run(cli: &Cli) -> Result<()> {
    info!(
        "Loading schema '{}' from {}",
        cli.schema,
        display_source(&cli.source)
    );

    let provider = create_provider(&cli.source).await?;
    let tables = provider.load_tables(&cli.schema).await?;
    info!(
        "Loaded {} tables via {} provider",
        tables.len(),
        provider.provider_name()
    );

    // Nothing is written until the document has rendered
    let selection = cli.selection().await?;
    let snapshot = cli
        .dump_schema
        .as_ref()
        .map(|path| (path, SchemaSnapshot::new(cli.schema.clone(), tables.clone())));
    let document = generate(tables, &selection, &cli.diagram_options())?;

    if let Some((path, snapshot)) = snapshot {
        save_snapshot(&snapshot, path).await?;
    }

    let target = cli.output_target();
    write_document(&document, &target)?;

    if let OutputTarget::File(path) = &target {
        info!("Wrote diagram to {}", target);
        info!("Render it with: java -jar plantuml.jar -verbose {}", path.display());
    }

    Ok(())
}

/// Source for log messages: URLs are redacted, file paths shown as given.
fn display_source(source: &str) -> String {
    if source.contains("://") {
        redact_database_url(source)
    } else {
        source.to_string()
    }
}

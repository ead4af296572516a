//! Folio CLI
//!
//! Command-line interface for the Folio portfolio library.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use folio::cli::commands;
use folio::cli::{Cli, Commands};
use folio::FolioConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Folio v{}", env!("CARGO_PKG_VERSION"));

    let config = FolioConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Some(cmd) => handle_command(cmd, &cli.store, &config).await,
        None => {
            println!("Folio v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

async fn handle_command(
    cmd: Commands,
    store: &std::path::Path,
    config: &FolioConfig,
) -> anyhow::Result<()> {
    let library = commands::open_library(store, config)
        .with_context(|| format!("opening store {}", store.display()))?;

    let result = match cmd {
        Commands::List => commands::list(&library),
        Commands::Show { id } => commands::show(&library, &id),
        Commands::Import { file, version } => commands::import(&library, &file, version),
        Commands::Delete { id } => commands::delete(&library, &id),
        Commands::Duplicate { id } => commands::duplicate(&library, &id),
        Commands::History { id } => commands::history(&library, &id),
        Commands::Restore { id, version_id } => commands::restore(&library, &id, &version_id),
        Commands::Render { id } => commands::render(&library, &id),
        Commands::ExportHtml { id, out, assets } => {
            commands::export_html(library.clone(), config, &id, &out, assets.as_deref()).await
        }
        Commands::Usage => commands::usage(&library),
    };

    result.map_err(|e| {
        if e.is_retryable() {
            warn!("{} may succeed if retried", e.error_code());
        }
        let hint = e.recovery_suggestion().map(|s| format!(" ({})", s)).unwrap_or_default();
        anyhow::anyhow!("{} [{}]{}", e, e.error_code(), hint)
    })
}

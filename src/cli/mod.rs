//! CLI Module
//!
//! Command-line interface over a directory-backed portfolio store.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio - portfolio library, renderer and exporter
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (JSON)
    #[arg(short, long, global = true, default_value = "folio.json")]
    pub config: PathBuf,

    /// Store directory
    #[arg(short, long, global = true, default_value = ".folio")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored portfolios
    #[command(name = "list")]
    List,

    /// Print a portfolio as JSON
    #[command(name = "show")]
    Show {
        /// Portfolio id
        id: String,
    },

    /// Save a portfolio from a JSON file
    #[command(name = "import")]
    Import {
        /// File holding a portfolio draft
        file: PathBuf,

        /// Snapshot the stored version before overwriting it
        #[arg(long)]
        version: bool,
    },

    /// Delete a portfolio
    #[command(name = "delete")]
    Delete {
        /// Portfolio id
        id: String,
    },

    /// Copy a portfolio under a new id
    #[command(name = "duplicate")]
    Duplicate {
        /// Portfolio id
        id: String,
    },

    /// Show saved versions
    #[command(name = "history")]
    History {
        /// Portfolio id
        id: String,
    },

    /// Restore a saved version
    #[command(name = "restore")]
    Restore {
        /// Portfolio id
        id: String,

        /// Version id from `history`
        version_id: String,
    },

    /// Print rendered markup
    #[command(name = "render")]
    Render {
        /// Portfolio id
        id: String,
    },

    /// Export a standalone HTML document
    #[command(name = "export-html")]
    ExportHtml {
        /// Portfolio id
        id: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Directory that relative image paths resolve against
        #[arg(long)]
        assets: Option<PathBuf>,
    },

    /// Show storage usage and health warnings
    #[command(name = "usage")]
    Usage,
}

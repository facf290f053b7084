//! Jabcom CLI
//!
//! Command-line tools for Jabcom file stores.
//!
//! # Commands
//!
//! - `inspect` - Display store statistics
//! - `dump` - Print stored records
//! - `get` - Print the record stored under a key
//! - `key` - Parse and explain a key string
//! - `compact` - Rewrite the record log without dead entries

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use error::CliError;
use output::Format;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Jabcom command-line store tools.
#[derive(Parser)]
#[command(name = "jabcom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display store statistics
    Inspect,

    /// Print stored records in insertion order
    Dump {
        /// Only records of this kind
        #[arg(short, long)]
        kind: Option<String>,

        /// Only records below this key (requires --kind)
        #[arg(short, long, requires = "kind")]
        ancestor: Option<String>,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the record stored under a key
    Get {
        /// Key in its string form, e.g. `Parent:'p/Child:1`
        key: String,
    },

    /// Parse and explain a key string
    Key {
        /// Key in its string form
        key: String,
    },

    /// Rewrite the record log without dead entries
    Compact,

    /// Show version information
    Version,
}

fn require_path<'a>(path: Option<&'a Path>, command: &'static str) -> Result<&'a Path, CliError> {
    path.ok_or(CliError::MissingPath(command))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = cli.path.as_deref();
    match cli.command {
        Commands::Inspect => {
            commands::inspect::run(require_path(path, "inspect")?, cli.format)?;
        }
        Commands::Dump {
            kind,
            ancestor,
            limit,
        } => {
            let filter = commands::dump::Filter {
                kind,
                ancestor,
                limit,
            };
            commands::dump::run(require_path(path, "dump")?, &filter, cli.format)?;
        }
        Commands::Get { key } => {
            commands::get::run(require_path(path, "get")?, &key, cli.format)?;
        }
        Commands::Key { key } => {
            commands::key::run(&key, cli.format)?;
        }
        Commands::Compact => {
            commands::compact::run(require_path(path, "compact")?, cli.format)?;
        }
        Commands::Version => {
            println!("Jabcom CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

//! wapsrv CLI
//!
//! Command-line tools for inspecting and administering a file-backed
//! wapsrv annotation store.
//!
//! # Commands
//!
//! - `init` - Create the store and seed the root container
//! - `show` - Display a container
//! - `page` - Display one page of a container's annotations
//! - `mkdir` - Create a container
//! - `rmdir` - Delete an empty container
//! - `annotate` - Add an annotation to a container

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// wapsrv command-line store tools.
#[derive(Parser)]
#[command(name = "wapsrv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store and seed the root container
    Init,

    /// Display a container
    Show {
        /// Container IRI (defaults to the root)
        iri: Option<String>,

        /// Description and counts only, no embedded page
        #[arg(short, long)]
        minimal: bool,

        /// List annotation IRIs instead of descriptions
        #[arg(short, long)]
        iris: bool,
    },

    /// Display one page of a container's annotations
    Page {
        /// Container IRI or page IRI
        iri: String,

        /// Zero-based page number
        #[arg(short = 'n', long, default_value = "0")]
        page: i64,

        /// List annotation IRIs instead of descriptions
        #[arg(short, long)]
        iris: bool,
    },

    /// Create a container
    Mkdir {
        /// Parent container IRI
        parent: String,

        /// Name of the new container (a UUID if absent)
        #[arg(short, long)]
        slug: Option<String>,

        /// Label of the new container
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Delete an empty container and its annotations
    Rmdir {
        /// Container IRI
        iri: String,

        /// Current ETag of the container
        #[arg(short, long)]
        etag: String,
    },

    /// Add an annotation to a container
    Annotate {
        /// Container IRI
        container: String,

        /// Target IRI (repeatable)
        #[arg(short, long, required = true)]
        target: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = commands::open_engine(cli.path.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::init::run(&engine)?,
        Commands::Show { iri, minimal, iris } => {
            commands::show::run(&engine, iri.as_deref(), minimal, iris)?;
        }
        Commands::Page { iri, page, iris } => commands::page::run(&engine, &iri, page, iris)?,
        Commands::Mkdir {
            parent,
            slug,
            label,
        } => commands::mkdir::run(&engine, &parent, slug.as_deref(), label.as_deref())?,
        Commands::Rmdir { iri, etag } => commands::rmdir::run(&engine, &iri, &etag)?,
        Commands::Annotate { container, target } => {
            commands::annotate::run(&engine, &container, &target)?;
        }
    }

    Ok(())
}

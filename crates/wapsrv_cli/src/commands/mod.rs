//! CLI command implementations.

pub mod annotate;
pub mod init;
pub mod mkdir;
pub mod page;
pub mod rmdir;
pub mod show;

use serde::Serialize;
use std::path::Path;
use wapsrv_core::{WapConfig, WapEngine};

/// Loads the configuration and opens the file-backed engine.
///
/// `--path` overrides `database_path` from the configuration file.
pub fn open_engine(
    path: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<WapEngine, Box<dyn std::error::Error>> {
    let mut config = match config_file {
        Some(file) => WapConfig::from_json_file(file)?,
        None => WapConfig::new(),
    };
    if let Some(path) = path {
        config = config.database_path(path);
    }
    if config.database_path.is_none() {
        return Err("Store path required (--path or database_path in the config file)".into());
    }
    tracing::debug!(path = ?config.database_path, "opening store");
    Ok(WapEngine::open(config)?)
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Command-line interface.

pub mod commands;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from `path`, or from `.fieldflow/` when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Open the configured database and bring its schema up to date.
pub async fn open_database(config: &Config) -> Result<SqlitePool> {
    let pool_config = PoolConfig {
        max_connections: config.database.max_connections,
        ..PoolConfig::default()
    };
    initialize_database(&config.database.url(), Some(pool_config))
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))
}

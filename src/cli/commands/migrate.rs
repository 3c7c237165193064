//! Implementation of the `fieldflow migrate` command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::{load_config, open_database};

/// Arguments for `fieldflow migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Configuration file (defaults to .fieldflow/config.yaml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// Apply pending migrations and report the schema version.
pub async fn execute(args: MigrateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let pool = open_database(&config).await?;
    pool.close().await;
    println!("Database at {} is up to date", config.database.path);
    Ok(())
}

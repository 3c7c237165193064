//! CLI type definitions

use clap::{Parser, Subcommand};

use crate::cli::commands::{migrate::MigrateArgs, serve::ServeArgs};

/// fieldflow command line.
#[derive(Parser)]
#[command(name = "fieldflow")]
#[command(about = "fieldflow - project lifecycle workflow service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Apply pending database migrations and exit
    Migrate(MigrateArgs),
}

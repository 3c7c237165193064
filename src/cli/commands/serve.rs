//! Implementation of the `fieldflow serve` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::http::ProjectsHttpServer;
use crate::adapters::sqlite::{SqliteActivityRepository, SqliteProjectRepository};
use crate::cli::{load_config, open_database};
use crate::domain::ports::{SystemClock, TracingNotifier};
use crate::infrastructure::logging::LoggerImpl;
use crate::services::WorkflowService;

/// Arguments for `fieldflow serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Configuration file (defaults to .fieldflow/config.yaml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long, short)]
    pub port: Option<u16>,
}

/// Run the HTTP API until Ctrl-C.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _logger = LoggerImpl::init(&config.logging)?;
    let pool = open_database(&config).await?;

    let workflow = WorkflowService::new(
        Arc::new(SqliteProjectRepository::new(pool.clone())),
        Arc::new(SqliteActivityRepository::new(pool.clone())),
        Arc::new(SystemClock),
        Arc::new(TracingNotifier),
        config.workflow.trouble_assignee.clone(),
    );

    let server = ProjectsHttpServer::new(workflow, config.server.clone());
    server
        .serve_with_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("HTTP server failed")?;

    pool.close().await;
    Ok(())
}

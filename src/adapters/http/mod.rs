//! Projects HTTP server.
//!
//! Thin JSON binding over the workflow services: one route per logical
//! operation plus a health check.

pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::ServerConfig;
use crate::domain::ports::{ActivityRepository, ProjectRepository};
use crate::services::WorkflowService;

pub use types::ErrorResponse;

/// Shared state for the handlers.
pub struct AppState<P: ProjectRepository, A: ActivityRepository> {
    /// Workflow services the handlers drive.
    pub workflow: WorkflowService<P, A>,
}

/// Build the API router.
pub fn build_router<P, A>(workflow: WorkflowService<P, A>, enable_cors: bool) -> Router
where
    P: ProjectRepository + 'static,
    A: ActivityRepository + 'static,
{
    let state = Arc::new(AppState { workflow });

    let app = Router::new()
        .route("/api/v1/projects/{id}/status", post(handlers::change_status::<P, A>))
        .route(
            "/api/v1/projects/{id}/deal-result/toggle",
            post(handlers::toggle_deal_result::<P, A>),
        )
        .route(
            "/api/v1/projects/{id}/deal-result",
            post(handlers::set_deal_result::<P, A>),
        )
        .route("/api/v1/projects/{id}/trouble", post(handlers::set_trouble::<P, A>))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Projects HTTP server.
pub struct ProjectsHttpServer<P: ProjectRepository + 'static, A: ActivityRepository + 'static> {
    config: ServerConfig,
    workflow: WorkflowService<P, A>,
}

impl<P: ProjectRepository + 'static, A: ActivityRepository + 'static> ProjectsHttpServer<P, A> {
    /// Create a server bound to `config.host:config.port` once started.
    pub fn new(workflow: WorkflowService<P, A>, config: ServerConfig) -> Self {
        Self { config, workflow }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = build_router(self.workflow, self.config.enable_cors);

        tracing::info!("fieldflow HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

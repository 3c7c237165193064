//! fieldflow - project lifecycle workflow engine
//!
//! Tracks field-operations projects through six ordered stages, with
//! per-transition policies, a two-phase confirm-before-commit protocol, the
//! lost/hold/trouble flags and an append-only activity log.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Project model, stages, errors and ports
//! - **Service Layer** (`services`): Stage policies, transitions, flags, activity log
//! - **Adapters** (`adapters`): SQLite persistence and the HTTP API
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use fieldflow::services::{TransitionRequest, WorkflowService};
//!
//! let outcome = workflow.transitions.submit(project_id, TransitionRequest::next()).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    ActivityLogEntry, ActivityType, Config, DealResult, InstallationInfo, ProjectRecord, Stage,
    TransitionData,
};
pub use domain::ports::{ActivityRepository, Clock, Notifier, ProjectRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ConfirmationProtocol, FlagCoordinator, StagePolicyTable, StatusTransitionEngine,
    TransitionOutcome, TransitionRequest, WorkflowService,
};

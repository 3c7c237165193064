//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that adapters implement:
//! - ProjectRepository: persistence of project records
//! - ActivityRepository: append-only activity log storage
//! - Notifier: best-effort outbound notification of changes
//! - Clock: source of the current instant and calendar date
//!
//! These traits keep the workflow services independent of SQLite, HTTP
//! and wall-clock time.

pub mod activity_repository;
pub mod clock;
pub mod notifier;
pub mod project_repository;

pub use activity_repository::ActivityRepository;
pub use clock::{Clock, FixedClock, SystemClock};
pub use notifier::{ChangeNotice, Notifier, TracingNotifier};
pub use project_repository::ProjectRepository;

//! Outbound notification port.
//!
//! Delivery belongs to another subsystem. Callers treat it as best effort:
//! a failed notification is logged and never fails the mutation that
//! triggered it.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::ActivityType;

/// What changed, as handed to the notification subsystem.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeNotice {
    /// Project that changed
    pub project_id: Uuid,
    /// Stage or flag change
    pub activity_type: ActivityType,
    /// Same text as the activity entry
    pub description: String,
    /// Who made the change, when known
    pub actor: Option<String>,
}

/// Outbound notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &ChangeNotice) -> anyhow::Result<()>;
}

/// Notifier that only emits a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notice: &ChangeNotice) -> anyhow::Result<()> {
        tracing::info!(
            project_id = %notice.project_id,
            activity_type = notice.activity_type.as_str(),
            actor = notice.actor.as_deref().unwrap_or("-"),
            "{}",
            notice.description
        );
        Ok(())
    }
}

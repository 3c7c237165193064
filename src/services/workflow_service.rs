//! Wiring for the workflow services over one pair of repositories.

use std::sync::Arc;

use crate::domain::ports::{ActivityRepository, Clock, Notifier, ProjectRepository};
use crate::services::activity_recorder::ActivityRecorder;
use crate::services::confirmation::ConfirmationProtocol;
use crate::services::flag_coordinator::FlagCoordinator;
use crate::services::transition_engine::StatusTransitionEngine;

/// Stage transitions, flag changes and the activity trail for one store.
pub struct WorkflowService<P: ProjectRepository, A: ActivityRepository> {
    /// Shared transition engine
    pub engine: Arc<StatusTransitionEngine<P, A>>,
    /// Confirm-before-commit stage moves
    pub transitions: ConfirmationProtocol<P, A>,
    /// Lost/hold and trouble flags
    pub flags: FlagCoordinator<P, A>,
    /// Activity history
    pub activity: ActivityRecorder<A>,
}

impl<P: ProjectRepository, A: ActivityRepository> WorkflowService<P, A> {
    /// Wire the services over shared ports.
    pub fn new(
        projects: Arc<P>,
        activities: Arc<A>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        trouble_assignee: impl Into<String>,
    ) -> Self {
        let activity = ActivityRecorder::new(activities, clock.clone());
        let engine = Arc::new(StatusTransitionEngine::new(
            projects.clone(),
            activity.clone(),
            clock.clone(),
            notifier.clone(),
        ));
        let flags = FlagCoordinator::new(projects, activity.clone(), clock, notifier, trouble_assignee);
        Self {
            transitions: ConfirmationProtocol::new(engine.clone()),
            engine,
            flags,
            activity,
        }
    }
}

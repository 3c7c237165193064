pub mod activity_recorder;
pub mod confirmation;
pub mod flag_coordinator;
pub mod notify;
pub mod stage_policy;
pub mod transition_engine;
pub mod workflow_service;

pub use activity_recorder::ActivityRecorder;
pub use confirmation::{ConfirmationProtocol, TransitionAction, TransitionOutcome, TransitionRequest};
pub use flag_coordinator::{DealAction, FlagCoordinator, ToggleAction, TroubleUpdate};
pub use stage_policy::{Rejection, StagePolicy, StagePolicyTable};
pub use transition_engine::{
    CurrentValues, DescriptorKind, StatusTransitionEngine, TransitionDecision, TransitionDescriptor,
};
pub use workflow_service::WorkflowService;

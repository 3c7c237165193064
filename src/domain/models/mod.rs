pub mod activity;
pub mod config;
pub mod project;
pub mod stage;

pub use activity::{ActivityLogEntry, ActivityType};
pub use config::{
    Config, DatabaseConfig, LogFormat, LoggingConfig, RotationPolicy, ServerConfig, WorkflowConfig,
};
pub use project::{
    DealResult, FieldChange, InstallationInfo, ProjectRecord, TransitionData, TroubleContext,
    FIELD_DELIVERY_DATE, FIELD_ESTIMATED_AMOUNT, FIELD_INSTALLATION_CONTRACTOR,
    FIELD_INSTALLATION_DATE, FIELD_REVENUE,
};
pub use stage::Stage;

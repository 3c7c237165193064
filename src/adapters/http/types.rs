//! Request and response bodies for the projects HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::models::{InstallationInfo, ProjectRecord, Stage, TransitionData};
use crate::services::{
    CurrentValues, DealAction, DescriptorKind, ToggleAction, TransitionAction, TransitionDescriptor,
    TransitionRequest,
};

/// Blank strings count as absent; anything else must be `YYYY-MM-DD`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Installation booking as sent by clients. Blank dates count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationData {
    /// Contractor name; blank counts as missing
    #[serde(default)]
    pub contractor: Option<String>,
    /// Booked day, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
}

/// Body of `POST /api/v1/projects/{id}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    /// `next` or `previous`
    pub action: TransitionAction,
    /// Commit instead of returning a confirmation descriptor
    #[serde(default)]
    pub confirm: bool,
    /// Required for the move into the arranged stage
    #[serde(default)]
    pub installation_data: Option<InstallationData>,
    /// Written with the move when present
    #[serde(default)]
    pub revenue: Option<i64>,
    /// Written with the move when present
    #[serde(default, deserialize_with = "lenient_date")]
    pub delivery_date: Option<NaiveDate>,
    /// Written with the move when present
    #[serde(default)]
    pub estimated_amount: Option<i64>,
    /// Recorded on the activity entry
    #[serde(default)]
    pub actor: Option<String>,
}

impl From<StatusRequest> for TransitionRequest {
    fn from(req: StatusRequest) -> Self {
        let data = TransitionData {
            installation: req.installation_data.map(|d| InstallationInfo {
                contractor: d.contractor,
                date: d.date,
            }),
            revenue: req.revenue,
            delivery_date: req.delivery_date,
            estimated_amount: req.estimated_amount,
        };
        Self {
            action: req.action,
            confirm: req.confirm,
            data,
            actor: req.actor,
        }
    }
}

/// Body of the toggle endpoint.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// `toggleLost` or `toggleHold`
    pub action: ToggleAction,
    /// Recorded on the activity entry
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body of the explicit deal result endpoint.
#[derive(Debug, Deserialize)]
pub struct DealResultRequest {
    /// `lost`, `hold` or `clear`
    pub action: DealAction,
    /// Recorded on the activity entry
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body of the trouble endpoint.
#[derive(Debug, Deserialize)]
pub struct TroubleRequest {
    /// Raise (`true`) or clear (`false`)
    #[serde(alias = "troubleFlag")]
    pub trouble_flag: bool,
    /// Recorded on the activity entry
    #[serde(default)]
    pub actor: Option<String>,
}

/// External view of a project. Lost and hold are exposed as two booleans.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    /// Project identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Stage code
    pub stage: Stage,
    /// Human-readable stage name
    pub stage_label: &'static str,
    /// Deal marked lost
    pub lost_flag: bool,
    /// Deal on hold
    pub hold_flag: bool,
    /// Project flagged as troubled
    pub trouble_flag: bool,
    /// Current owner code
    pub assignee: String,
    /// Assignee to restore when trouble is cleared
    pub backup_assignee: Option<String>,
    /// Booked installation contractor
    pub installation_contractor: Option<String>,
    /// Booked installation day
    pub installation_date: Option<NaiveDate>,
    /// Final revenue figure
    pub revenue: Option<i64>,
    /// Expected delivery from the supplier
    pub delivery_date: Option<NaiveDate>,
    /// Estimated deal amount
    pub estimated_amount: Option<i64>,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
    /// Optimistic locking version
    pub version: u64,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(p: ProjectRecord) -> Self {
        Self {
            id: p.id,
            lost_flag: p.lost_flag(),
            hold_flag: p.hold_flag(),
            trouble_flag: p.trouble_flag(),
            backup_assignee: p.backup_assignee().map(str::to_string),
            name: p.name,
            stage: p.stage,
            stage_label: p.stage.label(),
            assignee: p.assignee,
            installation_contractor: p.installation_contractor,
            installation_date: p.installation_date,
            revenue: p.revenue,
            delivery_date: p.delivery_date,
            estimated_amount: p.estimated_amount,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
            version: p.version,
        }
    }
}

/// `{ message, project }`
#[derive(Debug, Serialize)]
pub struct ProjectEnvelope {
    /// Outcome of the request
    pub message: String,
    /// Record after the change
    pub project: ProjectResponse,
}

/// `{ project }`
#[derive(Debug, Serialize)]
pub struct ProjectOnly {
    /// Record after the change
    pub project: ProjectResponse,
}

/// Returned with 200 when the caller has to confirm or supply data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorResponse {
    /// Set when the user must confirm
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_confirmation: bool,
    /// Set when installation contractor and date must be supplied
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_installation_info: bool,
    /// What the caller is asked to confirm or supply
    pub message: String,
    /// Fields the caller must send with the retry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<&'static str>,
    /// Values to review before re-submitting
    pub current_values: CurrentValues,
}

impl From<TransitionDescriptor> for DescriptorResponse {
    fn from(d: TransitionDescriptor) -> Self {
        Self {
            requires_confirmation: d.kind == DescriptorKind::Confirmation,
            requires_installation_info: d.kind == DescriptorKind::InstallationInfo,
            message: d.message,
            required_fields: d.required_fields,
            current_values: d.current_values,
        }
    }
}

/// Response of the status endpoint.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    /// Caller must confirm or supply data
    Descriptor(DescriptorResponse),
    /// Move committed or nothing to do
    Project(ProjectEnvelope),
}

/// Error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code, e.g. `NOT_FOUND`
    pub code: String,
    /// Missing fields for `VALIDATION_FAILED`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Date that blocks the move for `PRECONDITION_FAILED`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_date: Option<NaiveDate>,
}

impl ErrorResponse {
    /// Error body with no extra detail.
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            fields: None,
            blocking_date: None,
        }
    }
}

//! Project domain model.
//!
//! A project is created by the intake flow at the first stage and is then
//! mutated only through stage transitions and flag changes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Outcome of the sales deal. Lost and hold are mutually exclusive, which
/// the enum makes structural; the external API exposes the pair as two
/// booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DealResult {
    /// Deal is live
    #[default]
    Active,
    /// Deal was lost to a competitor or cancelled
    Lost,
    /// Deal is paused
    Hold,
}

impl DealResult {
    /// Stored code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Lost => "lost",
            Self::Hold => "hold",
        }
    }

    /// Rebuild from the stored boolean pair. Both set is not representable.
    pub fn from_flags(lost: bool, hold: bool) -> Option<Self> {
        match (lost, hold) {
            (false, false) => Some(Self::Active),
            (true, false) => Some(Self::Lost),
            (false, true) => Some(Self::Hold),
            (true, true) => None,
        }
    }

    /// Whether this is the lost state.
    pub fn lost_flag(&self) -> bool {
        matches!(self, Self::Lost)
    }

    /// Whether this is the hold state.
    pub fn hold_flag(&self) -> bool {
        matches!(self, Self::Hold)
    }

    /// Flip the lost flag. Turning it on clears hold.
    pub fn toggled_lost(self) -> Self {
        match self {
            Self::Lost => Self::Active,
            Self::Active | Self::Hold => Self::Lost,
        }
    }

    /// Flip the hold flag. Turning it on clears lost.
    pub fn toggled_hold(self) -> Self {
        match self {
            Self::Hold => Self::Active,
            Self::Active | Self::Lost => Self::Hold,
        }
    }

    /// Prose used in activity descriptions.
    pub fn describe(&self) -> String {
        format!("lost={}, hold={}", self.lost_flag(), self.hold_flag())
    }
}

/// Saved context while a project is flagged as troubled.
///
/// Acts as a one-slot stack: the assignee captured when trouble was raised
/// is restored when it is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleContext {
    /// Assignee at the moment trouble was raised, if one was captured
    pub backup_assignee: Option<String>,
}

/// Installation booking supplied with the move into the arranged stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationInfo {
    /// Contractor booked for the job
    #[serde(default)]
    pub contractor: Option<String>,
    /// Day the installation is booked for
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl InstallationInfo {
    /// Create a new value.
    pub fn new(contractor: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            contractor: Some(contractor.into()),
            date: Some(date),
        }
    }

    /// Contractor with surrounding whitespace removed, `None` when blank.
    pub fn contractor_trimmed(&self) -> Option<&str> {
        self.contractor
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Names of the required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.contractor_trimmed().is_none() {
            missing.push(FIELD_INSTALLATION_CONTRACTOR);
        }
        if self.date.is_none() {
            missing.push(FIELD_INSTALLATION_DATE);
        }
        missing
    }
}

/// Field name of the installation contractor in errors and descriptors.
pub const FIELD_INSTALLATION_CONTRACTOR: &str = "installation_contractor";
/// Field name of the installation date in errors and descriptors.
pub const FIELD_INSTALLATION_DATE: &str = "installation_date";
/// Field revenue
pub const FIELD_REVENUE: &str = "revenue";
/// Field delivery date
pub const FIELD_DELIVERY_DATE: &str = "delivery_date";
/// Field estimated amount
pub const FIELD_ESTIMATED_AMOUNT: &str = "estimated_amount";

/// Extra data that may accompany a forward transition. Every field is
/// independent; whichever are present are written with the stage change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionData {
    /// Contractor and date, for the move into the arranged stage
    #[serde(default)]
    pub installation: Option<InstallationInfo>,
    /// Final revenue figure
    #[serde(default)]
    pub revenue: Option<i64>,
    /// Expected delivery from the supplier
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    /// Estimated deal amount
    #[serde(default)]
    pub estimated_amount: Option<i64>,
}

impl TransitionData {
    /// Set the installation.
    pub fn with_installation(mut self, info: InstallationInfo) -> Self {
        self.installation = Some(info);
        self
    }

    /// Set the revenue.
    pub fn with_revenue(mut self, revenue: i64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    /// Set the delivery date.
    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Set the estimated amount.
    pub fn with_estimated_amount(mut self, amount: i64) -> Self {
        self.estimated_amount = Some(amount);
        self
    }
}

/// A single field that changed value during a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Field name, one of the `FIELD_*` constants
    pub field: &'static str,
    /// Value before the change
    pub old: Option<String>,
    /// Value after the change
    pub new: Option<String>,
}

impl FieldChange {
    fn compare<T: ToString + PartialEq>(
        field: &'static str,
        old: Option<&T>,
        new: Option<&T>,
    ) -> Option<Self> {
        if old == new {
            return None;
        }
        Some(Self {
            field,
            old: old.map(ToString::to_string),
            new: new.map(ToString::to_string),
        })
    }
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.field,
            self.old.as_deref().unwrap_or("(none)"),
            self.new.as_deref().unwrap_or("(none)")
        )
    }
}

/// A tracked field-operations project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Current lifecycle stage
    pub stage: Stage,
    /// Lost/hold state
    pub deal_result: DealResult,
    /// Present while the project is flagged as troubled
    pub trouble: Option<TroubleContext>,
    /// Current owner code
    pub assignee: String,
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
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
    /// Version for optimistic locking
    pub version: u64,
}

impl ProjectRecord {
    /// Create a project at the first stage.
    pub fn new(name: impl Into<String>, assignee: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            stage: Stage::first(),
            deal_result: DealResult::default(),
            trouble: None,
            assignee: assignee.into(),
            installation_contractor: None,
            installation_date: None,
            revenue: None,
            delivery_date: None,
            estimated_amount: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Set stage directly (intake and test fixtures only).
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Set the installation date.
    pub fn with_installation_date(mut self, date: NaiveDate) -> Self {
        self.installation_date = Some(date);
        self
    }

    /// Set the delivery date.
    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    /// Whether the deal is marked lost.
    pub fn lost_flag(&self) -> bool {
        self.deal_result.lost_flag()
    }

    /// Whether the deal is on hold.
    pub fn hold_flag(&self) -> bool {
        self.deal_result.hold_flag()
    }

    /// Whether the project is flagged as troubled.
    pub fn trouble_flag(&self) -> bool {
        self.trouble.is_some()
    }

    /// Assignee saved when trouble was raised, if troubled.
    pub fn backup_assignee(&self) -> Option<&str> {
        self.trouble
            .as_ref()
            .and_then(|t| t.backup_assignee.as_deref())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Move to `to` and write whichever extra fields were supplied.
    ///
    /// Returns the extra fields whose values actually changed.
    pub fn apply_transition(
        &mut self,
        to: Stage,
        data: &TransitionData,
        now: DateTime<Utc>,
    ) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        if let Some(info) = &data.installation {
            if let Some(contractor) = info.contractor_trimmed() {
                let contractor = contractor.to_string();
                changes.extend(FieldChange::compare(
                    FIELD_INSTALLATION_CONTRACTOR,
                    self.installation_contractor.as_ref(),
                    Some(&contractor),
                ));
                self.installation_contractor = Some(contractor);
            }
            if let Some(date) = info.date {
                changes.extend(FieldChange::compare(
                    FIELD_INSTALLATION_DATE,
                    self.installation_date.as_ref(),
                    Some(&date),
                ));
                self.installation_date = Some(date);
            }
        }
        if let Some(date) = data.delivery_date {
            changes.extend(FieldChange::compare(
                FIELD_DELIVERY_DATE,
                self.delivery_date.as_ref(),
                Some(&date),
            ));
            self.delivery_date = Some(date);
        }
        if let Some(revenue) = data.revenue {
            changes.extend(FieldChange::compare(
                FIELD_REVENUE,
                self.revenue.as_ref(),
                Some(&revenue),
            ));
            self.revenue = Some(revenue);
        }
        if let Some(amount) = data.estimated_amount {
            changes.extend(FieldChange::compare(
                FIELD_ESTIMATED_AMOUNT,
                self.estimated_amount.as_ref(),
                Some(&amount),
            ));
            self.estimated_amount = Some(amount);
        }

        self.stage = to;
        self.touch(now);
        changes
    }

    /// Replace the deal result. Returns the previous value.
    pub fn set_deal_result(&mut self, result: DealResult, now: DateTime<Utc>) -> DealResult {
        let previous = self.deal_result;
        self.deal_result = result;
        self.touch(now);
        previous
    }

    /// Flag the project as troubled and hand it to `fallback`.
    ///
    /// Already troubled projects keep their original backup; returns
    /// `false` in that case and nothing changes.
    pub fn raise_trouble(&mut self, fallback: &str, now: DateTime<Utc>) -> bool {
        if self.trouble.is_some() {
            return false;
        }
        let previous = std::mem::replace(&mut self.assignee, fallback.to_string());
        self.trouble = Some(TroubleContext {
            backup_assignee: Some(previous),
        });
        self.touch(now);
        true
    }

    /// Clear the trouble flag, restoring the saved assignee if one exists.
    ///
    /// Returns `false` when the project was not troubled.
    pub fn clear_trouble(&mut self, now: DateTime<Utc>) -> bool {
        let Some(context) = self.trouble.take() else {
            return false;
        };
        if let Some(backup) = context.backup_assignee {
            self.assignee = backup;
        }
        self.touch(now);
        true
    }
}

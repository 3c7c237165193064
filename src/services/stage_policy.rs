//! Stage policy table.
//!
//! Declarative per-transition rules for the forward moves between adjacent
//! stages. Backward moves and boundary no-ops carry no policy. Evaluation is
//! pure: the caller supplies the record, the proposed extra data and the
//! current calendar date.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::domain::errors::DomainError;
use crate::domain::models::{
    ProjectRecord, Stage, TransitionData, FIELD_INSTALLATION_CONTRACTOR, FIELD_INSTALLATION_DATE,
};

/// Date gate a transition must pass before it may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateGate {
    None,
    /// The installation date the record will carry after the move must
    /// exist and must not be in the future.
    InstallationDateReached,
}

/// Static rule for one forward move.
#[derive(Debug, Clone, Copy)]
struct TransitionRule {
    from: Stage,
    to: Stage,
    requires_confirmation: bool,
    required_fields: &'static [&'static str],
    gate: DateGate,
}

const RULES: [TransitionRule; 5] = [
    TransitionRule {
        from: Stage::InTalks,
        to: Stage::Ordered,
        requires_confirmation: false,
        required_fields: &[],
        gate: DateGate::None,
    },
    TransitionRule {
        from: Stage::Ordered,
        to: Stage::InternationalOrderPlaced,
        requires_confirmation: true,
        required_fields: &[],
        gate: DateGate::None,
    },
    TransitionRule {
        from: Stage::InternationalOrderPlaced,
        to: Stage::InstallationArranged,
        requires_confirmation: false,
        required_fields: &[FIELD_INSTALLATION_CONTRACTOR, FIELD_INSTALLATION_DATE],
        gate: DateGate::None,
    },
    TransitionRule {
        from: Stage::InstallationArranged,
        to: Stage::InstallationComplete,
        requires_confirmation: true,
        required_fields: &[],
        gate: DateGate::InstallationDateReached,
    },
    TransitionRule {
        from: Stage::InstallationComplete,
        to: Stage::FinalBillingIssued,
        requires_confirmation: true,
        required_fields: &[],
        gate: DateGate::None,
    },
];

/// Why a policy disallows a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No policy entry exists for the pair
    NoRule { from: Stage, to: Stage },
    /// Required extra data is absent or blank
    MissingFields(Vec<&'static str>),
    /// The installation date has not been reached yet
    DateNotReached(NaiveDate),
}

impl Rejection {
    /// Convert to the error returned to callers.
    pub fn into_error(self) -> DomainError {
        match self {
            Self::NoRule { from, to } => DomainError::missing([format!("transition {} -> {}", from.as_str(), to.as_str())]),
            Self::MissingFields(fields) => DomainError::missing(fields),
            Self::DateNotReached(blocking_date) => DomainError::PreconditionFailed { blocking_date },
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRule { from, to } => {
                write!(f, "No transition is defined from {} to {}", from.label(), to.label())
            }
            Self::MissingFields(fields) => write!(f, "Missing required fields: {}", fields.join(", ")),
            Self::DateNotReached(date) => {
                write!(f, "Installation is scheduled for {date}; it cannot be completed before that date")
            }
        }
    }
}

/// Evaluated policy for one proposed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePolicy {
    /// Stage before the move
    pub from: Stage,
    /// Stage after the move
    pub to: Stage,
    /// Whether the hard checks passed
    pub allowed: bool,
    /// Why the move is not allowed
    pub reason: Option<String>,
    /// Whether the user must confirm before commit
    pub requires_confirmation: bool,
    /// Text shown when asking for confirmation
    pub confirmation_message: Option<String>,
    /// Extra fields the move requires
    pub requires_extra_data: BTreeSet<&'static str>,
    /// Structured form of `reason`
    pub rejection: Option<Rejection>,
}

impl StagePolicy {
    fn rejected(from: Stage, to: Stage, rejection: Rejection, required: BTreeSet<&'static str>) -> Self {
        Self {
            from,
            to,
            allowed: false,
            reason: Some(rejection.to_string()),
            requires_confirmation: false,
            confirmation_message: None,
            requires_extra_data: required,
            rejection: Some(rejection),
        }
    }
}

/// The forward transition rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagePolicyTable;

impl StagePolicyTable {
    /// Create a new value.
    pub fn new() -> Self {
        Self
    }

    fn rule(from: Stage, to: Stage) -> Option<&'static TransitionRule> {
        RULES.iter().find(|r| r.from == from && r.to == to)
    }

    /// Evaluate the move `from -> to` for `record`.
    ///
    /// Hard checks (required data, date gate) are evaluated every time;
    /// confirmation never bypasses them.
    pub fn evaluate(
        &self,
        from: Stage,
        to: Stage,
        record: &ProjectRecord,
        data: &TransitionData,
        today: NaiveDate,
    ) -> StagePolicy {
        let Some(rule) = Self::rule(from, to) else {
            return StagePolicy::rejected(from, to, Rejection::NoRule { from, to }, BTreeSet::new());
        };
        let required: BTreeSet<&'static str> = rule.required_fields.iter().copied().collect();

        if !required.is_empty() {
            let supplied = data.installation.clone().unwrap_or_default();
            let missing: Vec<&'static str> = supplied
                .missing_fields()
                .into_iter()
                .filter(|f| required.contains(f))
                .collect();
            if !missing.is_empty() {
                return StagePolicy::rejected(from, to, Rejection::MissingFields(missing), required);
            }
        }

        // A date supplied with the request overwrites the stored one on commit.
        let installation_date = data
            .installation
            .as_ref()
            .and_then(|info| info.date)
            .or(record.installation_date);

        if rule.gate == DateGate::InstallationDateReached {
            match installation_date {
                None => {
                    return StagePolicy::rejected(
                        from,
                        to,
                        Rejection::MissingFields(vec![FIELD_INSTALLATION_DATE]),
                        required,
                    );
                }
                Some(date) if today < date => {
                    return StagePolicy::rejected(from, to, Rejection::DateNotReached(date), required);
                }
                Some(_) => {}
            }
        }

        let confirmation_message = rule
            .requires_confirmation
            .then(|| confirmation_message(rule, record, installation_date));

        StagePolicy {
            from,
            to,
            allowed: true,
            reason: None,
            requires_confirmation: rule.requires_confirmation,
            confirmation_message,
            requires_extra_data: required,
            rejection: None,
        }
    }
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "not set".to_string(), |d| d.to_string())
}

fn confirmation_message(
    rule: &TransitionRule,
    record: &ProjectRecord,
    installation_date: Option<NaiveDate>,
) -> String {
    match (rule.from, rule.to) {
        (Stage::Ordered, Stage::InternationalOrderPlaced) => format!(
            "Confirm the international order has been placed. Current delivery date: {}",
            format_optional_date(record.delivery_date)
        ),
        (Stage::InstallationArranged, Stage::InstallationComplete) => format!(
            "Confirm installation was completed. Installation date: {}",
            format_optional_date(installation_date)
        ),
        (Stage::InstallationComplete, Stage::FinalBillingIssued) => format!(
            "Confirm the final bill has been issued. Recorded revenue: {}",
            record
                .revenue
                .map_or_else(|| "not set".to_string(), |r| r.to_string())
        ),
        (from, to) => format!("Confirm moving from {} to {}", from.label(), to.label()),
    }
}

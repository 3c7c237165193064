//! Project lifecycle stages.
//!
//! Stages form a strictly linear list. Neighbour lookup is index based, so
//! moving one step forward or backward is O(1) and only forward moves need
//! policy entries.

use serde::{Deserialize, Serialize};

/// One of the six ordered lifecycle states a project passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Initial negotiations with the client
    #[default]
    InTalks,
    /// Client placed the order
    Ordered,
    /// Order placed with the overseas supplier
    InternationalOrderPlaced,
    /// Contractor and date booked for installation
    InstallationArranged,
    /// Installation finished on site
    InstallationComplete,
    /// Final invoice sent
    FinalBillingIssued,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 6] = [
        Self::InTalks,
        Self::Ordered,
        Self::InternationalOrderPlaced,
        Self::InstallationArranged,
        Self::InstallationComplete,
        Self::FinalBillingIssued,
    ];

    /// Snake-case code used in storage and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InTalks => "in_talks",
            Self::Ordered => "ordered",
            Self::InternationalOrderPlaced => "international_order_placed",
            Self::InstallationArranged => "installation_arranged",
            Self::InstallationComplete => "installation_complete",
            Self::FinalBillingIssued => "final_billing_issued",
        }
    }

    /// Parse a stored code, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in_talks" => Some(Self::InTalks),
            "ordered" => Some(Self::Ordered),
            "international_order_placed" => Some(Self::InternationalOrderPlaced),
            "installation_arranged" => Some(Self::InstallationArranged),
            "installation_complete" => Some(Self::InstallationComplete),
            "final_billing_issued" => Some(Self::FinalBillingIssued),
            _ => None,
        }
    }

    /// Human-readable name used in activity descriptions and messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InTalks => "In talks",
            Self::Ordered => "Ordered",
            Self::InternationalOrderPlaced => "International order placed",
            Self::InstallationArranged => "Installation arranged",
            Self::InstallationComplete => "Installation complete",
            Self::FinalBillingIssued => "Final billing issued",
        }
    }

    /// Zero-based position in the lifecycle.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Stage new projects start in.
    pub fn first() -> Self {
        Self::ALL[0]
    }

    /// Terminal stage.
    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    /// Whether this is the first stage.
    pub fn is_first(&self) -> bool {
        *self == Self::first()
    }

    /// Whether this is the last stage.
    pub fn is_last(&self) -> bool {
        *self == Self::last()
    }

    /// Following stage, clamped at the final stage.
    pub fn next(&self) -> Self {
        let next = (self.index() + 1).min(Self::ALL.len() - 1);
        Self::ALL[next]
    }

    /// Preceding stage, clamped at the first stage.
    pub fn previous(&self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stage_string_codec() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_str(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_str("INSTALLATION_ARRANGED"), Some(Stage::InstallationArranged));
        assert!(Stage::from_str("shipped").is_none());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Stage::InternationalOrderPlaced).unwrap(),
            "\"international_order_placed\""
        );
    }

    #[test]
    fn test_boundaries_clamp() {
        assert_eq!(Stage::FinalBillingIssued.next(), Stage::FinalBillingIssued);
        assert_eq!(Stage::InTalks.previous(), Stage::InTalks);
        assert!(Stage::InTalks.is_first());
        assert!(Stage::FinalBillingIssued.is_last());
    }

    proptest! {
        #[test]
        fn prop_neighbours_are_one_step_apart(i in 0usize..6) {
            let stage = Stage::ALL[i];
            prop_assert_eq!(stage.index(), i);
            if !stage.is_last() {
                prop_assert_eq!(stage.next().index(), i + 1);
                prop_assert_eq!(stage.next().previous(), stage);
            }
            if !stage.is_first() {
                prop_assert_eq!(stage.previous().index(), i - 1);
            }
        }
    }
}

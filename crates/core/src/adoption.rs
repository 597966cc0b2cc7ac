//! Adoption request statuses and the allowed transitions between them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of the applicant's message.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdoptionStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl AdoptionStatus {
    pub const ALL: [AdoptionStatus; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown adoption status '{value}'. Expected one of: pending, approved, rejected, cancelled"
                ))
            })
    }

    /// Only pending requests can move; every decision is final.
    pub fn can_transition_to(&self, next: AdoptionStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Approved | Self::Rejected | Self::Cancelled
            )
        )
    }
}

/// Check a requested transition.
pub fn ensure_transition(from: AdoptionStatus, to: AdoptionStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

/// Statuses an administrator may set when deciding a request.
pub fn validate_decision(status: AdoptionStatus) -> Result<(), CoreError> {
    match status {
        AdoptionStatus::Approved | AdoptionStatus::Rejected => Ok(()),
        other => Err(CoreError::Validation(format!(
            "Decision must be 'approved' or 'rejected', got '{}'",
            other.as_str()
        ))),
    }
}

pub fn validate_message(message: Option<&str>) -> Result<(), CoreError> {
    match message {
        Some(text) if text.chars().count() > MAX_MESSAGE_LENGTH => Err(CoreError::Validation(
            format!("Message must be at most {MAX_MESSAGE_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_moves_to_any_terminal_status() {
        for next in [
            AdoptionStatus::Approved,
            AdoptionStatus::Rejected,
            AdoptionStatus::Cancelled,
        ] {
            assert!(AdoptionStatus::Pending.can_transition_to(next));
        }
        assert!(!AdoptionStatus::Pending.can_transition_to(AdoptionStatus::Pending));
    }

    #[test]
    fn terminal_statuses_are_final() {
        for from in [
            AdoptionStatus::Approved,
            AdoptionStatus::Rejected,
            AdoptionStatus::Cancelled,
        ] {
            for to in AdoptionStatus::ALL {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn ensure_transition_reports_conflict() {
        assert!(ensure_transition(AdoptionStatus::Pending, AdoptionStatus::Approved).is_ok());
        assert_matches!(
            ensure_transition(AdoptionStatus::Rejected, AdoptionStatus::Approved),
            Err(CoreError::InvalidTransition {
                from: AdoptionStatus::Rejected,
                to: AdoptionStatus::Approved,
            })
        );
    }

    #[test]
    fn decisions_are_approve_or_reject() {
        assert!(validate_decision(AdoptionStatus::Approved).is_ok());
        assert!(validate_decision(AdoptionStatus::Rejected).is_ok());
        assert!(validate_decision(AdoptionStatus::Cancelled).is_err());
        assert!(validate_decision(AdoptionStatus::Pending).is_err());
    }

    #[test]
    fn parse_round_trips_names() {
        for status in AdoptionStatus::ALL {
            assert_eq!(AdoptionStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(AdoptionStatus::parse("done").is_err());
    }

    #[test]
    fn message_length_is_capped() {
        assert!(validate_message(None).is_ok());
        assert!(validate_message(Some("I have a garden")).is_ok());
        assert!(validate_message(Some(&"m".repeat(MAX_MESSAGE_LENGTH + 1))).is_err());
    }
}

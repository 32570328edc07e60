use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub provider_id: String,
    pub service_id: String,
    pub appointment_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration: i32,
    pub special_requirements: Option<String>,
    pub status: AppointmentStatus,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Joined display fields, present only on listing queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
}

impl Appointment {
    pub fn involves(&self, user_id: &str) -> bool {
        self.patient_id == user_id || self.provider_id == user_id
    }
}

/// Appointment lifecycle labels, kebab-case on the wire (`in-progress`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::InProgress => write!(f, "in-progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl AppointmentStatus {
    /// Central allowed-transition table; every status write goes through
    /// this check. Re-asserting the current status is legal and treated as
    /// a no-op.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == next {
            return true;
        }

        matches!(
            (self, next),
            (Upcoming, InProgress) | (Upcoming, Cancelled) | (InProgress, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub new_date: NaiveDate,
    pub new_start_time: String,
    pub new_end_time: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn allowed_transitions_follow_the_table() {
        assert!(Upcoming.can_transition_to(InProgress));
        assert!(Upcoming.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Upcoming.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!InProgress.can_transition_to(Upcoming));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Upcoming));
    }

    #[test]
    fn reasserting_current_status_is_legal() {
        for status in [Upcoming, InProgress, Completed, Cancelled] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Upcoming, InProgress] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&InProgress).unwrap(), "\"in-progress\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(parsed, InProgress);
        assert_eq!(InProgress.to_string(), "in-progress");
    }
}

use serde::{Deserialize, Serialize};

use appointment_cell::models::Appointment;

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub upcoming_count: usize,
    pub next_appointment: Option<Appointment>,
    pub recent_appointments: Vec<Appointment>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub upcoming: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderDashboard {
    pub todays_appointments: Vec<Appointment>,
    pub status_counts: StatusCounts,
    pub total_earnings: f64,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub patients: usize,
    pub providers: usize,
    pub admins: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub user_counts: RoleCounts,
    pub total_providers: usize,
    pub providers_pending_verification: usize,
    pub total_appointments: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

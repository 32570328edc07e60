use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::services::AppointmentService;
use provider_cell::models::Provider;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::UserRole;

use crate::models::{
    AdminDashboard, DashboardError, PatientDashboard, ProviderDashboard, RoleCounts, StatusCounts,
};

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct AccountRow {
    #[allow(dead_code)]
    id: String,
    role: Option<String>,
}

pub struct DashboardService<'a> {
    config: &'a AppConfig,
    supabase: SupabaseClient,
}

impl<'a> DashboardService<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn patient_dashboard(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<PatientDashboard, DashboardError> {
        debug!("Building patient dashboard for {}", patient_id);

        let appointments = AppointmentService::new(self.config)
            .list_for_patient(patient_id, auth_token)
            .await
            .map_err(|e| DashboardError::ExternalServiceError(e.to_string()))?;

        Ok(patient_summary(appointments, Utc::now().date_naive()))
    }

    pub async fn provider_dashboard(
        &self,
        provider_id: &str,
        auth_token: &str,
    ) -> Result<ProviderDashboard, DashboardError> {
        debug!("Building provider dashboard for {}", provider_id);

        let appointments = AppointmentService::new(self.config)
            .list_for_provider(provider_id, auth_token)
            .await
            .map_err(|e| DashboardError::ExternalServiceError(e.to_string()))?;

        Ok(provider_summary(appointments, Utc::now().date_naive()))
    }

    pub async fn admin_dashboard(
        &self,
        auth_token: &str,
    ) -> Result<AdminDashboard, DashboardError> {
        debug!("Building admin dashboard");

        let users: Vec<AccountRow> = self
            .supabase
            .select("users", "", Some(auth_token))
            .await
            .map_err(|e| DashboardError::ExternalServiceError(e.to_string()))?;

        let providers: Vec<Provider> = self
            .supabase
            .select("providers", "", Some(auth_token))
            .await
            .map_err(|e| DashboardError::ExternalServiceError(e.to_string()))?;

        let appointments: Vec<Appointment> = self
            .supabase
            .select("appointments", "", Some(auth_token))
            .await
            .map_err(|e| DashboardError::ExternalServiceError(e.to_string()))?;

        let mut user_counts = RoleCounts::default();
        for user in &users {
            match user.role.as_deref().and_then(UserRole::parse) {
                Some(UserRole::Patient) => user_counts.patients += 1,
                Some(UserRole::Provider) => user_counts.providers += 1,
                Some(UserRole::Admin) => user_counts.admins += 1,
                None => {}
            }
        }

        let providers_pending_verification =
            providers.iter().filter(|p| !p.is_verified).count();

        Ok(AdminDashboard {
            user_counts,
            total_providers: providers.len(),
            providers_pending_verification,
            total_appointments: appointments.len(),
        })
    }
}

/// Patient view: how many upcoming, which one is next, and the recent tail.
/// Input is newest-first, as the listing endpoint returns it.
pub fn patient_summary(appointments: Vec<Appointment>, today: NaiveDate) -> PatientDashboard {
    let upcoming_count = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Upcoming)
        .count();

    let next_appointment = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Upcoming && a.appointment_date >= today)
        .min_by(|a, b| {
            (a.appointment_date, &a.start_time).cmp(&(b.appointment_date, &b.start_time))
        })
        .cloned();

    let recent_appointments = appointments.into_iter().take(RECENT_LIMIT).collect();

    PatientDashboard {
        upcoming_count,
        next_appointment,
        recent_appointments,
    }
}

/// Provider view: today's schedule, per-status counts, and completed
/// earnings.
pub fn provider_summary(appointments: Vec<Appointment>, today: NaiveDate) -> ProviderDashboard {
    let mut status_counts = StatusCounts::default();
    let mut total_earnings = 0.0;

    for appointment in &appointments {
        match appointment.status {
            AppointmentStatus::Upcoming => status_counts.upcoming += 1,
            AppointmentStatus::InProgress => status_counts.in_progress += 1,
            AppointmentStatus::Completed => {
                status_counts.completed += 1;
                total_earnings += appointment.amount.unwrap_or(0.0);
            }
            AppointmentStatus::Cancelled => status_counts.cancelled += 1,
        }
    }

    let mut todays_appointments: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| a.appointment_date == today && a.status != AppointmentStatus::Cancelled)
        .collect();
    todays_appointments.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    ProviderDashboard {
        todays_appointments,
        status_counts,
        total_earnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(
        id: &str,
        date: &str,
        start: &str,
        status: AppointmentStatus,
        amount: Option<f64>,
    ) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_id: "patient-1".to_string(),
            provider_id: "provider-1".to_string(),
            service_id: "general-checkup".to_string(),
            appointment_date: date.parse().unwrap(),
            start_time: start.to_string(),
            end_time: "23:59".to_string(),
            duration: 60,
            special_requirements: None,
            status,
            payment_method: None,
            payment_status: None,
            amount,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            provider_name: None,
            service_name: None,
            patient_name: None,
        }
    }

    #[test]
    fn patient_summary_picks_earliest_upcoming_as_next() {
        let today: NaiveDate = "2023-05-15".parse().unwrap();
        let appointments = vec![
            appointment("late", "2023-05-20", "09:00", AppointmentStatus::Upcoming, None),
            appointment("soon", "2023-05-16", "14:00", AppointmentStatus::Upcoming, None),
            appointment("sooner-same-day", "2023-05-16", "09:00", AppointmentStatus::Upcoming, None),
            appointment("done", "2023-05-10", "09:00", AppointmentStatus::Completed, None),
        ];

        let dashboard = patient_summary(appointments, today);

        assert_eq!(dashboard.upcoming_count, 3);
        assert_eq!(dashboard.next_appointment.unwrap().id, "sooner-same-day");
    }

    #[test]
    fn patient_summary_handles_empty_history() {
        let today: NaiveDate = "2023-05-15".parse().unwrap();
        let dashboard = patient_summary(Vec::new(), today);

        assert_eq!(dashboard.upcoming_count, 0);
        assert!(dashboard.next_appointment.is_none());
        assert!(dashboard.recent_appointments.is_empty());
    }

    #[test]
    fn provider_summary_counts_statuses_and_sums_completed_earnings() {
        let today: NaiveDate = "2023-05-15".parse().unwrap();
        let appointments = vec![
            appointment("a", "2023-05-15", "10:00", AppointmentStatus::Upcoming, Some(75.0)),
            appointment("b", "2023-05-15", "09:00", AppointmentStatus::InProgress, Some(75.0)),
            appointment("c", "2023-05-10", "09:00", AppointmentStatus::Completed, Some(112.5)),
            appointment("d", "2023-05-11", "09:00", AppointmentStatus::Completed, Some(37.5)),
            appointment("e", "2023-05-15", "11:00", AppointmentStatus::Cancelled, Some(75.0)),
        ];

        let dashboard = provider_summary(appointments, today);

        assert_eq!(
            dashboard.status_counts,
            StatusCounts { upcoming: 1, in_progress: 1, completed: 2, cancelled: 1 }
        );
        assert_eq!(dashboard.total_earnings, 150.0);

        // Today's schedule excludes cancelled and is ordered by start time.
        let ids: Vec<&str> = dashboard.todays_appointments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}

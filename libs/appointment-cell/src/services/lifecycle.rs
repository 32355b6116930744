// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentStatus, AppointmentError};

/// Status graph for appointments.
///
/// With `enforce` off every move between the four statuses is accepted and
/// only logged when it leaves the graph.
pub struct AppointmentLifecycleService {
    enforce: bool,
}

impl AppointmentLifecycleService {
    pub fn new(enforce: bool) -> Self {
        Self { enforce }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if current_status == new_status {
            return Ok(());
        }

        if !self.get_valid_transitions(current_status).contains(new_status) {
            if self.enforce {
                warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
                return Err(AppointmentError::InvalidStatusTransition {
                    from: *current_status,
                    to: *new_status,
                });
            }
            warn!("Status transition {} -> {} is outside the lifecycle graph", current_status, new_status);
            return Ok(());
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }
}

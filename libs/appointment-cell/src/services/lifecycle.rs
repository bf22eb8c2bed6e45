use tracing::{debug, info, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Status rules for appointments.
///
/// Staff may confirm or cancel a pending appointment. Completion is only
/// reachable through [`AppointmentLifecycleService::validate_completion`],
/// which prescription authoring calls. Completed and cancelled are terminal.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a status change requested through a staff edit. Re-asserting
    /// the current status is accepted as a no-op.
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if current_status == new_status {
            return Ok(());
        }

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Staff-reachable next statuses.
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
            AppointmentStatus::Confirmed => vec![],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    pub fn can_complete(&self, current_status: AppointmentStatus) -> bool {
        matches!(current_status, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn validate_completion(&self, current_status: AppointmentStatus) -> Result<(), AppointmentError> {
        if self.can_complete(current_status) {
            Ok(())
        } else {
            warn!("Cannot complete appointment in status {}", current_status);
            Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: AppointmentStatus::Completed,
            })
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use AppointmentStatus::*;

    #[test]
    fn test_pending_can_be_confirmed_or_cancelled() {
        let lifecycle = AppointmentLifecycleService::new();
        assert!(lifecycle.validate_status_transition(Pending, Confirmed).is_ok());
        assert!(lifecycle.validate_status_transition(Pending, Cancelled).is_ok());
    }

    #[test]
    fn test_staff_cannot_complete() {
        let lifecycle = AppointmentLifecycleService::new();
        for from in [Pending, Confirmed] {
            assert_matches!(
                lifecycle.validate_status_transition(from, Completed),
                Err(AppointmentError::InvalidStatusTransition { to: Completed, .. })
            );
        }
    }

    #[test]
    fn test_no_way_back_to_pending() {
        let lifecycle = AppointmentLifecycleService::new();
        for from in [Confirmed, Completed, Cancelled] {
            assert!(lifecycle.validate_status_transition(from, Pending).is_err());
        }
    }

    #[test]
    fn test_terminal_states_only_accept_themselves() {
        let lifecycle = AppointmentLifecycleService::new();
        for terminal in [Completed, Cancelled] {
            assert!(lifecycle.get_valid_transitions(terminal).is_empty());
            assert!(lifecycle.validate_status_transition(terminal, terminal).is_ok());
        }
        assert!(lifecycle.validate_status_transition(Cancelled, Confirmed).is_err());
    }

    #[test]
    fn test_completion_eligibility() {
        let lifecycle = AppointmentLifecycleService::new();
        assert!(lifecycle.validate_completion(Pending).is_ok());
        assert!(lifecycle.validate_completion(Confirmed).is_ok());
        assert!(lifecycle.validate_completion(Completed).is_err());
        assert!(lifecycle.validate_completion(Cancelled).is_err());
    }
}

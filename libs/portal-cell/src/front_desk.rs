//! Employee booking list.

use appointment_cell::models::{Appointment, AppointmentStatus, UpdateAppointmentRequest};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Confirmed,
}

impl StatusFilter {
    pub fn admits(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == AppointmentStatus::Pending,
            StatusFilter::Confirmed => status == AppointmentStatus::Confirmed,
        }
    }
}

/// Case-insensitive match on patient name, plain substring on phone.
pub fn matches_search(appointment: &Appointment, search: &str) -> bool {
    let search = search.trim();
    search.is_empty()
        || appointment.patient_name.to_lowercase().contains(&search.to_lowercase())
        || appointment.patient_phone.contains(search)
}

pub fn filter_bookings<'a, I>(appointments: I, filter: StatusFilter, search: &str) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments
        .into_iter()
        .filter(|apt| filter.admits(apt.status) && matches_search(apt, search))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffAction {
    Confirm,
    Cancel,
}

impl StaffAction {
    pub fn target(&self) -> AppointmentStatus {
        match self {
            StaffAction::Confirm => AppointmentStatus::Confirmed,
            StaffAction::Cancel => AppointmentStatus::Cancelled,
        }
    }

    pub fn request(&self) -> UpdateAppointmentRequest {
        UpdateAppointmentRequest::status(self.target())
    }
}

/// Staff may only act on pending bookings.
pub fn available_actions(appointment: &Appointment) -> &'static [StaffAction] {
    match appointment.status {
        AppointmentStatus::Pending => &[StaffAction::Confirm, StaffAction::Cancel],
        _ => &[],
    }
}

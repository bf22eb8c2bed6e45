use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AppState, Collection};

use crate::models::{DayLabel, Doctor, DoctorError, WeeklySchedule};
use crate::services::slots::{generate_slots, parse_clock};

pub fn day_label(date: NaiveDate) -> DayLabel {
    date.weekday().into()
}

/// Slots the schedule offers on `day`. Disabled or missing days offer none.
pub fn slots_for_day(schedule: &WeeklySchedule, day: DayLabel) -> Result<Vec<String>, DoctorError> {
    match schedule.day(day) {
        Some(entry) if entry.enabled => {
            generate_slots(&entry.start, &entry.end).map_err(|e| DoctorError::schedule(day, e))
        }
        _ => Ok(Vec::new()),
    }
}

/// Rejects enabled days whose times do not parse or whose start is not
/// before the end. Disabled days are not checked.
pub fn validate_schedule(schedule: &WeeklySchedule) -> Result<(), DoctorError> {
    for (day, entry) in schedule.0.iter().filter(|(_, entry)| entry.enabled) {
        let start = parse_clock(&entry.start).map_err(|e| DoctorError::schedule(*day, e))?;
        let end = parse_clock(&entry.end).map_err(|e| DoctorError::schedule(*day, e))?;
        if start >= end {
            return Err(DoctorError::InvalidSchedule {
                day: *day,
                reason: format!("start {} must be before end {}", entry.start, entry.end),
            });
        }
    }
    Ok(())
}

pub struct AvailabilityService {
    doctors: Collection<Doctor>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: state.db.collection(),
        }
    }

    /// Recomputes `availableSlots` for `today`. Nothing re-runs this on a
    /// date change; callers trigger it.
    pub async fn refresh_doctor(&self, doctor_id: Uuid, today: NaiveDate) -> Result<Doctor, DoctorError> {
        let day = day_label(today);
        debug!("Refreshing availability for doctor {} on {}", doctor_id, day);

        let refreshed = self.doctors
            .try_update(doctor_id, |doctor| {
                doctor.available_slots = slots_for_day(&doctor.schedule, day)?;
                doctor.updated_at = Utc::now();
                Ok::<(), DoctorError>(())
            })
            .await
            .map_err(|e| {
                warn!("Availability refresh failed for doctor {}: {}", doctor_id, e);
                e
            })?
            .ok_or(DoctorError::NotFound)?;

        info!(
            "Doctor {} has {} slots on {}",
            refreshed.id,
            refreshed.available_slots.len(),
            day
        );
        Ok(refreshed)
    }
}

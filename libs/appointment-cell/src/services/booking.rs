use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use doctor_cell::services::slots::parse_clock;
use patient_cell::PatientService;
use shared_database::{AppState, Collection};

use crate::models::{
    Appointment, AppointmentError, AppointmentQuery, AppointmentStatus, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentService {
    appointments: Collection<Appointment>,
    doctors: Collection<Doctor>,
    patients: PatientService,
    lifecycle: AppointmentLifecycleService,
}

fn checked_time(time: &str) -> Result<String, AppointmentError> {
    let time = time.trim();
    parse_clock(time).map_err(|e| AppointmentError::ValidationError(e.to_string()))?;
    Ok(time.to_string())
}

/// Query values that do not parse can never match.
fn id_filter(raw: Option<&str>) -> Result<Option<Uuid>, ()> {
    raw.map(|v| Uuid::parse_str(v.trim()).map_err(|_| ())).transpose()
}

impl AppointmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            appointments: state.db.collection(),
            doctors: state.db.collection(),
            patients: PatientService::new(state),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn search_appointments(&self, query: &AppointmentQuery) -> Vec<Appointment> {
        let filters = (
            id_filter(query.doctor_id.as_deref()),
            id_filter(query.patient_id.as_deref()),
            id_filter(query.branch_id.as_deref()),
            query.status.as_deref().map(|s| AppointmentStatus::parse(s).ok_or(())).transpose(),
            query
                .date
                .as_deref()
                .map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| ()))
                .transpose(),
        );
        let (Ok(doctor_id), Ok(patient_id), Ok(branch_id), Ok(status), Ok(date)) = filters else {
            debug!("Appointment query has an unparsable filter, nothing matches");
            return Vec::new();
        };

        self.appointments
            .find_where(|a| {
                doctor_id.map_or(true, |id| a.doctor_id == id)
                    && patient_id.map_or(true, |id| a.patient_id == id)
                    && branch_id.map_or(true, |id| a.branch_id == id)
                    && status.map_or(true, |s| a.status == s)
                    && date.map_or(true, |d| a.date == d)
            })
            .await
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .find_by_id(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)
    }

    /// Books a pending appointment. Names and phone are copied from the
    /// referenced records and the appointment id is appended to the
    /// patient's history.
    pub async fn book_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking appointment for patient {} with doctor {} at {} {}",
            request.patient_id, request.doctor_id, request.date, request.time
        );

        let time = checked_time(&request.time)?;
        let patient = self.patients
            .get_patient(request.patient_id)
            .await
            .map_err(|_| AppointmentError::PatientNotFound)?;
        let doctor = self.doctors
            .find_by_id(request.doctor_id)
            .await
            .ok_or(AppointmentError::DoctorNotFound)?;

        let branch_id = request.branch_id.unwrap_or(doctor.branch_id);
        if branch_id != doctor.branch_id {
            warn!("Doctor {} is not at branch {}", doctor.id, branch_id);
            return Err(AppointmentError::BranchMismatch(branch_id));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            patient_name: patient.name,
            patient_phone: patient.phone,
            doctor_id: doctor.id,
            doctor_name: doctor.name,
            branch_id,
            date: request.date,
            time,
            status: AppointmentStatus::Pending,
            notes: request.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let appointment = self.appointments.insert(appointment).await?;

        if let Err(e) = self.patients.append_history(appointment.patient_id, appointment.id).await {
            warn!(
                "Patient {} vanished while booking {}: {}",
                appointment.patient_id, appointment.id, e
            );
            self.appointments.delete(appointment.id).await;
            return Err(AppointmentError::PatientNotFound);
        }

        info!(
            "Appointment {} booked as {} for {} {}",
            appointment.id, appointment.status, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Staff edit. Status changes go through the lifecycle rules; completion
    /// is never reachable here.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let time = request.time.as_deref().map(checked_time).transpose()?;

        let updated = self.appointments
            .try_update(appointment_id, |appointment| {
                if let Some(status) = request.status {
                    self.lifecycle.validate_status_transition(appointment.status, status)?;
                    appointment.status = status;
                }
                if let Some(date) = request.date {
                    appointment.date = date;
                }
                if let Some(time) = time {
                    appointment.time = time;
                }
                if let Some(notes) = request.notes {
                    appointment.notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
                }
                appointment.updated_at = Utc::now();
                Ok::<(), AppointmentError>(())
            })
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} updated, status {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Fails unless the appointment exists and may still be completed.
    pub async fn ensure_completable(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.lifecycle.validate_completion(appointment.status)?;
        Ok(appointment)
    }

    /// Marks the visit completed. Only prescription authoring calls this.
    pub async fn complete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Completing appointment: {}", appointment_id);

        let completed = self.appointments
            .try_update(appointment_id, |appointment| {
                self.lifecycle.validate_completion(appointment.status)?;
                appointment.status = AppointmentStatus::Completed;
                appointment.updated_at = Utc::now();
                Ok::<(), AppointmentError>(())
            })
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} completed", completed.id);
        Ok(completed)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        self.appointments
            .delete(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }
}

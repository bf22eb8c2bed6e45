use chrono::{Local, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use appointment_cell::AppointmentService;
use doctor_cell::models::Doctor;
use patient_cell::PatientService;
use shared_database::{AppState, Collection};

use crate::models::{
    CreatePrescriptionRequest, Medicine, MedicineInput, Prescription, PrescriptionError,
    PrescriptionQuery, UpdatePrescriptionRequest,
};

pub struct PrescriptionService {
    prescriptions: Collection<Prescription>,
    doctors: Collection<Doctor>,
    patients: PatientService,
    appointments: AppointmentService,
}

fn build_medicines(inputs: Vec<MedicineInput>) -> Result<Vec<Medicine>, PrescriptionError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let name = input.name.trim();
            if name.is_empty() {
                return Err(PrescriptionError::ValidationError(format!(
                    "medicine {} needs a name",
                    index + 1
                )));
            }
            Ok(Medicine {
                id: input.id.unwrap_or_else(Uuid::new_v4),
                name: name.to_string(),
                kind: input.kind,
                dosage: input.dosage.trim().to_string(),
                duration: input.duration.trim().to_string(),
            })
        })
        .collect()
}

fn clean_tests(tests: Vec<String>) -> Vec<String> {
    tests
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn id_filter(raw: Option<&str>) -> Option<Option<Uuid>> {
    match raw {
        None => Some(None),
        Some(raw) => Uuid::parse_str(raw.trim()).ok().map(Some),
    }
}

impl PrescriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            prescriptions: state.db.collection(),
            doctors: state.db.collection(),
            patients: PatientService::new(state),
            appointments: AppointmentService::new(state),
        }
    }

    pub async fn list_prescriptions(&self, query: &PrescriptionQuery) -> Vec<Prescription> {
        let (Some(patient_id), Some(doctor_id), Some(appointment_id)) = (
            id_filter(query.patient_id.as_deref()),
            id_filter(query.doctor_id.as_deref()),
            id_filter(query.appointment_id.as_deref()),
        ) else {
            return Vec::new();
        };

        self.prescriptions
            .find_where(|p| {
                patient_id.map_or(true, |id| p.patient_id == id)
                    && doctor_id.map_or(true, |id| p.doctor_id == id)
                    && appointment_id.map_or(true, |id| p.appointment_id == Some(id))
            })
            .await
    }

    pub async fn get_prescription(&self, prescription_id: Uuid) -> Result<Prescription, PrescriptionError> {
        self.prescriptions
            .find_by_id(prescription_id)
            .await
            .ok_or(PrescriptionError::NotFound)
    }

    /// Stores the prescription and, when it is tied to an appointment, moves
    /// that appointment to completed. Without an appointment the prescription
    /// is stored as an orphan and no status changes.
    pub async fn create_prescription(
        &self,
        request: CreatePrescriptionRequest,
        author_id: Option<Uuid>,
    ) -> Result<Prescription, PrescriptionError> {
        debug!("Creating prescription for appointment {:?}", request.appointment_id);

        let appointment = match request.appointment_id {
            Some(id) => Some(self.appointments.ensure_completable(id).await?),
            None => None,
        };

        let patient_id = request
            .patient_id
            .or_else(|| appointment.as_ref().map(|a| a.patient_id))
            .ok_or_else(|| PrescriptionError::ValidationError("patientId is required".to_string()))?;
        if let Some(appointment) = &appointment {
            if appointment.patient_id != patient_id {
                return Err(PrescriptionError::ValidationError(
                    "patientId does not match the appointment".to_string(),
                ));
            }
        }
        self.patients
            .get_patient(patient_id)
            .await
            .map_err(|_| PrescriptionError::PatientNotFound)?;

        let doctor_id = author_id
            .or(request.doctor_id)
            .or_else(|| appointment.as_ref().map(|a| a.doctor_id))
            .ok_or_else(|| PrescriptionError::ValidationError("doctorId is required".to_string()))?;
        let doctor = self.doctors
            .find_by_id(doctor_id)
            .await
            .ok_or(PrescriptionError::DoctorNotFound)?;

        let date = request.date.unwrap_or_else(|| Local::now().date_naive());
        let digital_signature = request
            .digital_signature
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("{}, {}", doctor.name, date));

        let now = Utc::now();
        let prescription = Prescription {
            id: Uuid::new_v4(),
            appointment_id: appointment.as_ref().map(|a| a.id),
            date,
            patient_id,
            doctor_id: doctor.id,
            medicines: build_medicines(request.medicines)?,
            tests: clean_tests(request.tests),
            notes: request.notes.trim().to_string(),
            digital_signature,
            created_at: now,
            updated_at: now,
        };

        let prescription = self.prescriptions.insert(prescription).await?;

        if let Some(appointment_id) = prescription.appointment_id {
            if let Err(e) = self.appointments.complete_appointment(appointment_id).await {
                error!(
                    "Completing appointment {} failed, dropping prescription {}: {}",
                    appointment_id, prescription.id, e
                );
                self.prescriptions.delete(prescription.id).await;
                return Err(e.into());
            }
        }

        info!(
            "Prescription {} saved with {} medicines{}",
            prescription.id,
            prescription.medicines.len(),
            if prescription.is_orphan() { " (no appointment)" } else { "" }
        );
        Ok(prescription)
    }

    pub async fn update_prescription(
        &self,
        prescription_id: Uuid,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        debug!("Updating prescription: {}", prescription_id);

        let medicines = request.medicines.map(build_medicines).transpose()?;

        let updated = self.prescriptions
            .update(prescription_id, |prescription| {
                if let Some(medicines) = medicines {
                    prescription.medicines = medicines;
                }
                if let Some(tests) = request.tests {
                    prescription.tests = clean_tests(tests);
                }
                if let Some(notes) = request.notes {
                    prescription.notes = notes.trim().to_string();
                }
                prescription.updated_at = Utc::now();
            })
            .await
            .ok_or(PrescriptionError::NotFound)?;

        info!("Prescription {} updated", updated.id);
        Ok(updated)
    }

    pub async fn delete_prescription(&self, prescription_id: Uuid) -> Result<(), PrescriptionError> {
        self.prescriptions
            .delete(prescription_id)
            .await
            .ok_or(PrescriptionError::NotFound)?;

        info!("Prescription {} deleted", prescription_id);
        Ok(())
    }
}

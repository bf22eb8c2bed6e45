use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AppState, Collection, StoreError};

use crate::models::{
    is_valid_age, is_valid_phone, CreatePatientRequest, Patient, PatientError, PatientQuery,
    UpdatePatientRequest, MAX_AGE, MIN_AGE,
};

pub struct PatientService {
    patients: Collection<Patient>,
}

fn required(value: &str, field: &str) -> Result<String, PatientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PatientError::ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn checked_phone(phone: &str) -> Result<String, PatientError> {
    let phone = required(phone, "phone")?;
    if !is_valid_phone(&phone) {
        return Err(PatientError::ValidationError("phone must be 11 digits".to_string()));
    }
    Ok(phone)
}

fn checked_age(age: u8) -> Result<u8, PatientError> {
    if !is_valid_age(age) {
        return Err(PatientError::ValidationError(format!(
            "age must be between {} and {}",
            MIN_AGE, MAX_AGE
        )));
    }
    Ok(age)
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            patients: state.db.collection(),
        }
    }

    pub async fn list_patients(&self, query: &PatientQuery) -> Vec<Patient> {
        let phone = query.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let needle = query.q.as_deref().unwrap_or_default();

        self.patients
            .find_where(|p| phone.map_or(true, |phone| p.phone == phone) && p.matches(needle))
            .await
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        self.patients
            .find_by_id(patient_id)
            .await
            .ok_or(PatientError::NotFound)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Option<Patient> {
        let phone = phone.trim();
        self.patients.find_one(|p| p.phone == phone).await
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Registering patient with phone: {}", request.phone);

        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: required(&request.name, "name")?,
            phone: checked_phone(&request.phone)?,
            age: checked_age(request.age)?,
            gender: request.gender,
            address: required(&request.address, "address")?,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let phone = patient.phone.clone();
        let patient = self.patients
            .insert_unique(patient, "phone", |existing, new| existing.phone == new.phone)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => {
                    warn!("Rejected duplicate patient phone {}", phone);
                    PatientError::PhoneTaken(phone.clone())
                }
                other => other.into(),
            })?;

        info!("Patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient: {}", patient_id);

        let name = request.name.as_deref().map(|v| required(v, "name")).transpose()?;
        let phone = request.phone.as_deref().map(checked_phone).transpose()?;
        let age = request.age.map(checked_age).transpose()?;
        let address = request.address.as_deref().map(|v| required(v, "address")).transpose()?;

        if let Some(phone) = &phone {
            let clash = self.find_by_phone(phone).await;
            if clash.is_some_and(|other| other.id != patient_id) {
                return Err(PatientError::PhoneTaken(phone.clone()));
            }
        }

        let updated = self.patients
            .update(patient_id, |patient| {
                if let Some(name) = name {
                    patient.name = name;
                }
                if let Some(phone) = phone {
                    patient.phone = phone;
                }
                if let Some(age) = age {
                    patient.age = age;
                }
                if let Some(gender) = request.gender {
                    patient.gender = gender;
                }
                if let Some(address) = address {
                    patient.address = address;
                }
                patient.updated_at = Utc::now();
            })
            .await
            .ok_or(PatientError::NotFound)?;

        info!("Patient {} updated", updated.id);
        Ok(updated)
    }

    /// Records an appointment against the patient. Appending an id already in
    /// the history is a no-op.
    pub async fn append_history(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<Patient, PatientError> {
        self.patients
            .update(patient_id, |patient| {
                if !patient.history.contains(&appointment_id) {
                    patient.history.push(appointment_id);
                    patient.updated_at = Utc::now();
                }
            })
            .await
            .ok_or(PatientError::NotFound)
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        debug!("Deleting patient: {}", patient_id);

        self.patients
            .delete(patient_id)
            .await
            .ok_or(PatientError::NotFound)?;

        info!("Patient {} deleted", patient_id);
        Ok(())
    }
}

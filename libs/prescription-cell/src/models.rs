use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use appointment_cell::AppointmentError;
use shared_database::{Document, StoreError};
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicineType {
    #[default]
    Tablet,
    Syrup,
    Injection,
}

impl MedicineType {
    pub const ALL: [MedicineType; 3] = [MedicineType::Tablet, MedicineType::Syrup, MedicineType::Injection];
}

impl fmt::Display for MedicineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MedicineType::Tablet => "Tablet",
            MedicineType::Syrup => "Syrup",
            MedicineType::Injection => "Injection",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MedicineType,
    /// Dose pattern such as `1-0-1`.
    pub dosage: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    /// `None` for a prescription written without a booked visit.
    pub appointment_id: Option<Uuid>,
    pub date: NaiveDate,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub medicines: Vec<Medicine>,
    pub tests: Vec<String>,
    pub notes: String,
    pub digital_signature: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Prescription {
    const COLLECTION: &'static str = "prescriptions";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Prescription {
    pub fn is_orphan(&self) -> bool {
        self.appointment_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: MedicineType,
    pub dosage: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionRequest {
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    /// Defaults to the appointment's patient.
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    /// Defaults to the signed-in doctor or the appointment's doctor.
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub medicines: Vec<MedicineInput>,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<String>,
}

/// Corrections only; appointment status is never touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrescriptionRequest {
    pub medicines: Option<Vec<MedicineInput>>,
    pub tests: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrescriptionError {
    #[error("Prescription not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error(transparent)]
    Appointment(#[from] AppointmentError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for PrescriptionError {
    fn from(err: StoreError) -> Self {
        PrescriptionError::DatabaseError(err.to_string())
    }
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::NotFound
            | PrescriptionError::PatientNotFound
            | PrescriptionError::DoctorNotFound => AppError::NotFound(err.to_string()),
            PrescriptionError::Appointment(inner) => inner.into(),
            PrescriptionError::ValidationError(msg) => AppError::ValidationError(msg),
            PrescriptionError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

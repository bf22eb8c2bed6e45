use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::{Document, StoreError};
use shared_models::error::AppError;

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;

/// Local mobile numbers are exactly 11 decimal digits, e.g. `01711111111`.
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"^[0-9]{11}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(phone))
}

pub fn is_valid_age(age: u8) -> bool {
    (MIN_AGE..=MAX_AGE).contains(&age)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    /// Natural deduplication key.
    pub phone: String,
    pub age: u8,
    pub gender: Gender,
    pub address: String,
    /// Appointment ids, oldest first.
    pub history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Patient {
    const COLLECTION: &'static str = "patients";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Patient {
    /// Case-insensitive substring match on the name, substring match on the phone.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle.to_lowercase()) || self.phone.contains(needle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub phone: String,
    pub age: u8,
    #[serde(default)]
    pub gender: Gender,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientQuery {
    pub phone: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("A patient with phone {0} already exists")]
    PhoneTaken(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for PatientError {
    fn from(err: StoreError) -> Self {
        PatientError::DatabaseError(err.to_string())
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::PhoneTaken(_) => AppError::BadRequest(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auth_cell::AuthError;
use shared_database::{Document, StoreError};
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::services::slots::SlotError;

/// Weekday keys of a [`WeeklySchedule`], serialized as `Mon`..`Sun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayLabel {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayLabel {
    pub const ALL: [DayLabel; 7] = [
        DayLabel::Mon,
        DayLabel::Tue,
        DayLabel::Wed,
        DayLabel::Thu,
        DayLabel::Fri,
        DayLabel::Sat,
        DayLabel::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::Mon => "Mon",
            DayLabel::Tue => "Tue",
            DayLabel::Wed => "Wed",
            DayLabel::Thu => "Thu",
            DayLabel::Fri => "Fri",
            DayLabel::Sat => "Sat",
            DayLabel::Sun => "Sun",
        }
    }
}

impl From<Weekday> for DayLabel {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayLabel::Mon,
            Weekday::Tue => DayLabel::Tue,
            Weekday::Wed => DayLabel::Wed,
            Weekday::Thu => DayLabel::Thu,
            Weekday::Fri => DayLabel::Fri,
            Weekday::Sat => DayLabel::Sat,
            Weekday::Sun => DayLabel::Sun,
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl ScheduleDay {
    pub fn working(start: &str, end: &str) -> Self {
        Self {
            enabled: true,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Disabled day with the editor's default hours.
    pub fn off() -> Self {
        Self {
            enabled: false,
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }
}

/// Per-weekday working hours. Days missing from the map count as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(pub BTreeMap<DayLabel, ScheduleDay>);

impl WeeklySchedule {
    /// Mon to Sat 10:00-14:00, Sunday off.
    pub fn standard() -> Self {
        let days = DayLabel::ALL
            .into_iter()
            .map(|day| {
                let entry = if day == DayLabel::Sun {
                    ScheduleDay::off()
                } else {
                    ScheduleDay::working("10:00", "14:00")
                };
                (day, entry)
            })
            .collect();
        WeeklySchedule(days)
    }

    /// Same hours on all seven days.
    pub fn every_day(start: &str, end: &str) -> Self {
        WeeklySchedule(
            DayLabel::ALL
                .into_iter()
                .map(|day| (day, ScheduleDay::working(start, end)))
                .collect(),
        )
    }

    pub fn day(&self, label: DayLabel) -> Option<&ScheduleDay> {
        self.0.get(&label)
    }

    pub fn set(&mut self, label: DayLabel, day: ScheduleDay) {
        self.0.insert(label, day);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub branch_id: Uuid,
    pub specialty: String,
    pub degree: String,
    pub schedule: WeeklySchedule,
    pub fees: f64,
    /// Slots for the day of the last refresh.
    pub available_slots: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Doctor {
    const COLLECTION: &'static str = "doctors";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub branch_id: Uuid,
    pub specialty: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default = "WeeklySchedule::standard")]
    pub schedule: WeeklySchedule,
    pub fees: f64,
    /// When present a doctor login is created with the doctor's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub branch_id: Option<Uuid>,
    pub specialty: Option<String>,
    pub degree: Option<String>,
    pub schedule: Option<WeeklySchedule>,
    pub fees: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQuery {
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Branch not found")]
    BranchNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid schedule for {day}: {reason}")]
    InvalidSchedule { day: DayLabel, reason: String },

    #[error(transparent)]
    Account(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for DoctorError {
    fn from(err: StoreError) -> Self {
        DoctorError::DatabaseError(err.to_string())
    }
}

impl DoctorError {
    pub(crate) fn schedule(day: DayLabel, err: SlotError) -> Self {
        DoctorError::InvalidSchedule {
            day,
            reason: err.to_string(),
        }
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::BranchNotFound | DoctorError::InvalidSchedule { .. } => {
                AppError::ValidationError(err.to_string())
            }
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::Account(auth) => auth.into(),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

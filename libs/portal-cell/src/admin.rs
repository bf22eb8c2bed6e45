//! Administrator overview, branch editing and doctor schedule editing.

use branch_cell::models::{Branch, ColorTheme, CreateBranchRequest, UpdateBranchRequest};
use doctor_cell::models::{DayLabel, Doctor, ScheduleDay, UpdateDoctorRequest, WeeklySchedule};
use doctor_cell::services::availability::{slots_for_day, validate_schedule};

use crate::error::{FieldErrors, PortalError};

/// Flat consultation estimate used for the revenue figure.
pub const REVENUE_PER_APPOINTMENT: u64 = 800;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverviewStats {
    pub doctors: usize,
    pub patients: usize,
    pub appointments: usize,
    pub revenue: u64,
}

impl OverviewStats {
    pub fn new(doctors: usize, patients: usize, appointments: usize) -> Self {
        Self {
            doctors,
            patients,
            appointments,
            revenue: appointments as u64 * REVENUE_PER_APPOINTMENT,
        }
    }
}

const BRANCH_REQUIRED: &str = "Name and Location required";

/// Editable copy of a branch, new or existing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchDraft {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub color_theme: ColorTheme,
    pub header_title: String,
    pub footer_text: String,
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl From<&Branch> for BranchDraft {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            location: branch.location.clone(),
            contact: branch.contact.clone(),
            color_theme: branch.color_theme,
            header_title: branch.header_title.clone().unwrap_or_default(),
            footer_text: branch.footer_text.clone().unwrap_or_default(),
        }
    }
}

impl BranchDraft {
    pub fn validate(&self) -> Result<(), PortalError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", BRANCH_REQUIRED.to_string());
        }
        if self.location.trim().is_empty() {
            errors.insert("location", BRANCH_REQUIRED.to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(errors))
        }
    }

    pub fn to_create(&self) -> Result<CreateBranchRequest, PortalError> {
        self.validate()?;
        Ok(CreateBranchRequest {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            color_theme: self.color_theme,
            contact: self.contact.trim().to_string(),
            header_title: optional(&self.header_title),
            footer_text: optional(&self.footer_text),
        })
    }

    pub fn to_update(&self) -> Result<UpdateBranchRequest, PortalError> {
        self.validate()?;
        Ok(UpdateBranchRequest {
            name: Some(self.name.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            color_theme: Some(self.color_theme),
            contact: Some(self.contact.trim().to_string()),
            header_title: optional(&self.header_title),
            footer_text: optional(&self.footer_text),
        })
    }
}

/// Weekly schedule being edited for one doctor. Days missing from the
/// stored schedule show up disabled with default hours.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEditor {
    schedule: WeeklySchedule,
}

impl ScheduleEditor {
    pub fn for_doctor(doctor: &Doctor) -> Self {
        Self {
            schedule: doctor.schedule.clone(),
        }
    }

    pub fn day(&self, label: DayLabel) -> ScheduleDay {
        self.schedule.day(label).cloned().unwrap_or_else(ScheduleDay::off)
    }

    fn edit(&mut self, label: DayLabel, f: impl FnOnce(&mut ScheduleDay)) {
        let mut day = self.day(label);
        f(&mut day);
        self.schedule.set(label, day);
    }

    pub fn toggle(&mut self, label: DayLabel) {
        self.edit(label, |day| day.enabled = !day.enabled);
    }

    pub fn set_hours(&mut self, label: DayLabel, start: &str, end: &str) {
        self.edit(label, |day| {
            day.start = start.to_string();
            day.end = end.to_string();
        });
    }

    /// Slots the day would produce, empty when disabled or malformed.
    pub fn preview(&self, label: DayLabel) -> Vec<String> {
        slots_for_day(&self.schedule, label).unwrap_or_default()
    }

    pub fn to_request(&self) -> Result<UpdateDoctorRequest, PortalError> {
        validate_schedule(&self.schedule).map_err(|e| PortalError::Rejected(e.to_string()))?;
        Ok(UpdateDoctorRequest {
            schedule: Some(self.schedule.clone()),
            ..Default::default()
        })
    }
}

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use auth_cell::{AccountProfile, AccountService, NewAccount};
use branch_cell::models::Branch;
use shared_database::{AppState, Collection};
use shared_models::auth::Role;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorQuery, UpdateDoctorRequest};
use crate::services::availability::{day_label, slots_for_day, validate_schedule};

pub struct DoctorService {
    doctors: Collection<Doctor>,
    branches: Collection<Branch>,
    accounts: AccountService,
    today: NaiveDate,
}

fn required(value: &str, field: &str) -> Result<String, DoctorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DoctorError::ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn valid_fee(fees: f64) -> Result<f64, DoctorError> {
    if fees.is_finite() && fees >= 0.0 {
        Ok(fees)
    } else {
        Err(DoctorError::ValidationError("fees must be a non-negative amount".to_string()))
    }
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self::for_day(state, Local::now().date_naive())
    }

    /// Service whose derived slots are computed for `today`.
    pub fn for_day(state: &AppState, today: NaiveDate) -> Self {
        Self {
            doctors: state.db.collection(),
            branches: state.db.collection(),
            accounts: AccountService::new(state),
            today,
        }
    }

    pub async fn list_doctors(&self, query: &DoctorQuery) -> Vec<Doctor> {
        match query.branch_id.as_deref() {
            None => self.doctors.find_all().await,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(branch_id) => self.doctors.find_where(|d| d.branch_id == branch_id).await,
                Err(_) => Vec::new(),
            },
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.doctors
            .find_by_id(doctor_id)
            .await
            .ok_or(DoctorError::NotFound)
    }

    async fn ensure_branch(&self, branch_id: Uuid) -> Result<(), DoctorError> {
        match self.branches.find_by_id(branch_id).await {
            Some(_) => Ok(()),
            None => Err(DoctorError::BranchNotFound),
        }
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor: {}", request.name);

        let name = required(&request.name, "name")?;
        let email = required(&request.email, "email")?.to_ascii_lowercase();
        let specialty = required(&request.specialty, "specialty")?;
        let fees = valid_fee(request.fees)?;
        validate_schedule(&request.schedule)?;
        self.ensure_branch(request.branch_id).await?;

        let available_slots = slots_for_day(&request.schedule, day_label(self.today))?;

        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name,
            email,
            role: Role::Doctor,
            branch_id: request.branch_id,
            specialty,
            degree: request.degree.trim().to_string(),
            schedule: request.schedule,
            fees,
            available_slots,
            created_at: now,
            updated_at: now,
        };

        let login = match request.password {
            Some(password) => Some(
                self.accounts
                    .create_account(NewAccount {
                        id: Some(doctor.id),
                        name: doctor.name.clone(),
                        email: doctor.email.clone(),
                        password,
                        role: Role::Doctor,
                        branch_id: doctor.branch_id.to_string(),
                    })
                    .await?,
            ),
            None => None,
        };

        let doctor = match self.doctors.insert(doctor).await {
            Ok(doctor) => doctor,
            Err(e) => {
                error!("Failed to store doctor: {}", e);
                if let Some(account) = login {
                    self.accounts.delete_account(account.id).await;
                }
                return Err(e.into());
            }
        };

        info!(
            "Doctor {} created in branch {} with {} slots today",
            doctor.id,
            doctor.branch_id,
            doctor.available_slots.len()
        );
        Ok(doctor)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor: {}", doctor_id);

        let name = request.name.as_deref().map(|v| required(v, "name")).transpose()?;
        let email = request
            .email
            .as_deref()
            .map(|v| required(v, "email").map(|e| e.to_ascii_lowercase()))
            .transpose()?;
        let specialty = request.specialty.as_deref().map(|v| required(v, "specialty")).transpose()?;
        let fees = request.fees.map(valid_fee).transpose()?;
        if let Some(branch_id) = request.branch_id {
            self.ensure_branch(branch_id).await?;
        }

        let refreshed_slots = match &request.schedule {
            Some(schedule) => {
                validate_schedule(schedule)?;
                Some(slots_for_day(schedule, day_label(self.today))?)
            }
            None => None,
        };

        let existing = self.get_doctor(doctor_id).await?;

        // Keep the doctor's login in step with the record.
        let profile = AccountProfile {
            name: name.clone().filter(|n| *n != existing.name),
            email: email.clone().filter(|e| *e != existing.email),
            branch_id: request
                .branch_id
                .filter(|b| *b != existing.branch_id)
                .map(|b| b.to_string()),
        };
        let login_synced = if profile.is_empty() {
            false
        } else {
            self.accounts.update_profile(doctor_id, profile).await?.is_some()
        };

        let updated = self.doctors
            .update(doctor_id, |doctor| {
                if let Some(name) = name {
                    doctor.name = name;
                }
                if let Some(email) = email {
                    doctor.email = email;
                }
                if let Some(specialty) = specialty {
                    doctor.specialty = specialty;
                }
                if let Some(degree) = request.degree {
                    doctor.degree = degree.trim().to_string();
                }
                if let Some(branch_id) = request.branch_id {
                    doctor.branch_id = branch_id;
                }
                if let Some(fees) = fees {
                    doctor.fees = fees;
                }
                if let (Some(schedule), Some(slots)) = (request.schedule, refreshed_slots) {
                    doctor.schedule = schedule;
                    doctor.available_slots = slots;
                }
                doctor.updated_at = Utc::now();
            })
            .await;

        let Some(updated) = updated else {
            if login_synced {
                let restore = AccountProfile {
                    name: Some(existing.name),
                    email: Some(existing.email),
                    branch_id: Some(existing.branch_id.to_string()),
                };
                if let Err(e) = self.accounts.update_profile(doctor_id, restore).await {
                    warn!("Could not restore login of doctor {}: {}", doctor_id, e);
                }
            }
            return Err(DoctorError::NotFound);
        };

        info!("Doctor {} updated", updated.id);
        Ok(updated)
    }

    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        self.doctors
            .delete(doctor_id)
            .await
            .ok_or(DoctorError::NotFound)?;
        if self.accounts.delete_account(doctor_id).await.is_some() {
            info!("Login of doctor {} removed", doctor_id);
        }

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }
}

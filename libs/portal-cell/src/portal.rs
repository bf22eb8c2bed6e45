use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentQuery};
use auth_cell::models::{LoginRequest, SessionUser};
use branch_cell::models::Branch;
use doctor_cell::models::Doctor;
use patient_cell::models::{Patient, PatientQuery};
use prescription_cell::models::{Prescription, PrescriptionQuery};
use shared_models::auth::Role;

use crate::admin::{BranchDraft, OverviewStats, ScheduleEditor};
use crate::api::ApiClient;
use crate::booking::{BookingReceipt, BookingWorkflow};
use crate::cache::EntityCache;
use crate::doctor_desk::{self, AppointmentLink, PrescriptionComposer};
use crate::error::PortalError;
use crate::front_desk::{self, StaffAction, StatusFilter};
use crate::roles::{self, palette, RouteTable, ThemePalette};

/// Signed-in portal session: the REST client plus local copies of every
/// collection. Collections are loaded once at login; afterwards each write
/// upserts the single record the server returns.
pub struct Portal {
    api: ApiClient,
    user: Option<SessionUser>,
    active_branch: Option<Uuid>,
    pub branches: EntityCache<Branch>,
    pub doctors: EntityCache<Doctor>,
    pub patients: EntityCache<Patient>,
    pub appointments: EntityCache<Appointment>,
    pub prescriptions: EntityCache<Prescription>,
}

impl Portal {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            user: None,
            active_branch: None,
            branches: EntityCache::new(),
            doctors: EntityCache::new(),
            patients: EntityCache::new(),
            appointments: EntityCache::new(),
            prescriptions: EntityCache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    fn signed_in(&self) -> Result<&SessionUser, PortalError> {
        self.user
            .as_ref()
            .ok_or_else(|| PortalError::Unauthorized("Not signed in".to_string()))
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionUser, PortalError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.api.session().set_token(&response.token).await?;

        // Signed in only once every collection is loaded.
        if let Err(e) = self.reload().await {
            warn!("Loading data for {} failed, signing out: {}", response.user.name, e);
            self.forget_local();
            if let Err(clear) = self.api.session().clear_token().await {
                warn!("Could not clear the stored token: {}", clear);
            }
            return Err(e);
        }

        info!("Signed in as {} ({})", response.user.name, response.user.role);
        self.user = Some(response.user.clone());
        Ok(response.user)
    }

    /// Replaces every cached collection with the server's copy.
    pub async fn reload(&mut self) -> Result<(), PortalError> {
        self.branches.replace_all(self.api.list_branches().await?);
        self.doctors.replace_all(self.api.list_doctors(None).await?);
        self.patients.replace_all(self.api.list_patients(&PatientQuery::default()).await?);
        self.appointments
            .replace_all(self.api.list_appointments(&AppointmentQuery::default()).await?);
        self.prescriptions
            .replace_all(self.api.list_prescriptions(&PrescriptionQuery::default()).await?);
        debug!(
            "Loaded {} branches, {} doctors, {} patients, {} appointments, {} prescriptions",
            self.branches.len(),
            self.doctors.len(),
            self.patients.len(),
            self.appointments.len(),
            self.prescriptions.len()
        );
        Ok(())
    }

    /// Forgets the user and every cached collection, then drops the stored
    /// token. The in-memory state is cleared even when the token write fails.
    pub async fn logout(&mut self) -> Result<(), PortalError> {
        self.forget_local();
        self.api.session().clear_token().await?;
        info!("Signed out");
        Ok(())
    }

    fn forget_local(&mut self) {
        self.user = None;
        self.active_branch = None;
        self.branches.clear();
        self.doctors.clear();
        self.patients.clear();
        self.appointments.clear();
        self.prescriptions.clear();
    }

    /// `None` until someone signs in.
    pub fn route_table(&self) -> Option<RouteTable> {
        self.user.as_ref().map(|user| roles::route(&user.role))
    }

    pub fn select_branch(&mut self, branch_id: Option<Uuid>) {
        self.active_branch = branch_id;
    }

    pub fn active_branch(&self) -> Option<&Branch> {
        self.active_branch.and_then(|id| self.branches.get(id))
    }

    pub fn theme(&self) -> ThemePalette {
        palette(self.active_branch().map(|b| b.color_theme))
    }

    pub fn overview(&self) -> OverviewStats {
        OverviewStats::new(self.doctors.len(), self.patients.len(), self.appointments.len())
    }

    pub fn bookings(&self, filter: StatusFilter, search: &str) -> Vec<&Appointment> {
        front_desk::filter_bookings(self.appointments.values(), filter, search)
    }

    pub fn my_queue(&self) -> Vec<&Appointment> {
        match &self.user {
            Some(user) => doctor_desk::my_queue(self.appointments.values(), user.id),
            None => Vec::new(),
        }
    }

    pub fn search_patients(&self, query: &str) -> Vec<&Patient> {
        doctor_desk::search_patients(self.patients.values(), query)
    }

    pub fn booking_workflow(&self) -> BookingWorkflow<ApiClient> {
        BookingWorkflow::new(self.api.clone())
    }

    /// Caches the records a confirmed booking created or changed.
    pub async fn record_booking(&mut self, receipt: &BookingReceipt) -> Result<(), PortalError> {
        self.appointments.upsert(receipt.appointment.clone());
        let patient = self.api.get_patient(receipt.patient.id).await?;
        self.patients.upsert(patient);
        Ok(())
    }

    pub async fn apply_staff_action(
        &mut self,
        appointment_id: Uuid,
        action: StaffAction,
    ) -> Result<Appointment, PortalError> {
        let updated = self
            .api
            .update_appointment(appointment_id, &action.request())
            .await?;
        info!("Appointment {} is now {}", updated.id, updated.status);
        self.appointments.upsert(updated.clone());
        Ok(updated)
    }

    /// Saves the composer's draft as the signed-in doctor. A linked visit is
    /// re-read afterwards since the server completes it.
    pub async fn save_prescription(
        &mut self,
        composer: &PrescriptionComposer,
        today: NaiveDate,
    ) -> Result<Prescription, PortalError> {
        let user = self.signed_in()?;
        if user.role() != Some(Role::Doctor) {
            return Err(PortalError::Forbidden("Only doctors write prescriptions".to_string()));
        }
        let doctor_id = user.id;
        let link = doctor_desk::link_for(&self.my_queue(), composer.patient_id());

        let prescription = self
            .api
            .create_prescription(&composer.to_request(doctor_id, link, today))
            .await?;
        self.prescriptions.upsert(prescription.clone());

        if let AppointmentLink::Visit(appointment_id) = link {
            let appointment = self.api.get_appointment(appointment_id).await?;
            self.appointments.upsert(appointment);
        }
        Ok(prescription)
    }

    /// Creates a branch, or updates `existing` when given.
    pub async fn save_branch(&mut self, existing: Option<Uuid>, draft: &BranchDraft) -> Result<Branch, PortalError> {
        let branch = match existing {
            Some(id) => self.api.update_branch(id, &draft.to_update()?).await?,
            None => self.api.create_branch(&draft.to_create()?).await?,
        };
        self.branches.upsert(branch.clone());
        Ok(branch)
    }

    pub async fn save_schedule(&mut self, doctor_id: Uuid, editor: &ScheduleEditor) -> Result<Doctor, PortalError> {
        let doctor = self.api.update_doctor(doctor_id, &editor.to_request()?).await?;
        self.doctors.upsert(doctor.clone());
        Ok(doctor)
    }

    pub async fn splash_seen(&self) -> Result<bool, PortalError> {
        self.api.session().splash_seen().await
    }

    pub async fn dismiss_splash(&self) -> Result<(), PortalError> {
        self.api.session().mark_splash_seen().await
    }
}

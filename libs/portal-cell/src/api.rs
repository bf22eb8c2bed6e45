use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentQuery, CreateAppointmentRequest, UpdateAppointmentRequest,
};
use auth_cell::models::{LoginRequest, LoginResponse};
use branch_cell::models::{Branch, CreateBranchRequest, UpdateBranchRequest};
use doctor_cell::models::{CreateDoctorRequest, Doctor, UpdateDoctorRequest};
use patient_cell::models::{CreatePatientRequest, Patient, PatientQuery, UpdatePatientRequest};
use prescription_cell::models::{
    CreatePrescriptionRequest, Prescription, PrescriptionQuery, UpdatePrescriptionRequest,
};

use crate::error::PortalError;
use crate::session::LocalStore;

/// Typed client for the REST surface. Every call except login carries the
/// bearer token read from the session store at call time. No call is retried.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<LocalStore>,
}

impl ApiClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>, session: Arc<LocalStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<LocalStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T>(&self, request: RequestBuilder, authorized: bool) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
    {
        let request = if authorized {
            match self.session.token().await? {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        } else {
            request
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            warn!("API error ({}): {}", status, message);
            return Err(PortalError::from_status(status.as_u16(), message));
        }

        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalError> {
        self.send(self.client.get(self.url(path)), true).await
    }

    async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.client.get(self.url(path)).query(query), true).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.client.post(self.url(path)).json(body), true).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.client.put(self.url(path)).json(body), true).await
    }

    async fn delete(&self, path: &str) -> Result<(), PortalError> {
        let _: Value = self.send(self.client.delete(self.url(path)), true).await?;
        Ok(())
    }

    // Auth

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, PortalError> {
        let builder = self.client.post(self.url("/users/login")).json(request);
        self.send(builder, false).await
    }

    // Branches

    pub async fn list_branches(&self) -> Result<Vec<Branch>, PortalError> {
        self.get("/branches").await
    }

    pub async fn create_branch(&self, request: &CreateBranchRequest) -> Result<Branch, PortalError> {
        self.post("/branches", request).await
    }

    pub async fn update_branch(&self, id: Uuid, request: &UpdateBranchRequest) -> Result<Branch, PortalError> {
        self.put(&format!("/branches/{}", id), request).await
    }

    // Doctors

    pub async fn list_doctors(&self, branch_id: Option<Uuid>) -> Result<Vec<Doctor>, PortalError> {
        match branch_id {
            Some(branch_id) => self.get_with("/doctors", &[("branchId", branch_id.to_string())]).await,
            None => self.get("/doctors").await,
        }
    }

    pub async fn get_doctor(&self, id: Uuid) -> Result<Doctor, PortalError> {
        self.get(&format!("/doctors/{}", id)).await
    }

    pub async fn create_doctor(&self, request: &CreateDoctorRequest) -> Result<Doctor, PortalError> {
        self.post("/doctors", request).await
    }

    pub async fn update_doctor(&self, id: Uuid, request: &UpdateDoctorRequest) -> Result<Doctor, PortalError> {
        self.put(&format!("/doctors/{}", id), request).await
    }

    pub async fn delete_doctor(&self, id: Uuid) -> Result<(), PortalError> {
        self.delete(&format!("/doctors/{}", id)).await
    }

    pub async fn refresh_availability(&self, id: Uuid) -> Result<Doctor, PortalError> {
        self.post(&format!("/doctors/{}/availability/refresh", id), &Value::Null).await
    }

    // Patients

    pub async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>, PortalError> {
        self.get_with("/patients", query).await
    }

    pub async fn find_patient_by_phone(&self, phone: &str) -> Result<Option<Patient>, PortalError> {
        let query = PatientQuery {
            phone: Some(phone.to_string()),
            q: None,
        };
        Ok(self.list_patients(&query).await?.into_iter().next())
    }

    pub async fn get_patient(&self, id: Uuid) -> Result<Patient, PortalError> {
        self.get(&format!("/patients/{}", id)).await
    }

    pub async fn create_patient(&self, request: &CreatePatientRequest) -> Result<Patient, PortalError> {
        self.post("/patients", request).await
    }

    pub async fn update_patient(&self, id: Uuid, request: &UpdatePatientRequest) -> Result<Patient, PortalError> {
        self.put(&format!("/patients/{}", id), request).await
    }

    pub async fn delete_patient(&self, id: Uuid) -> Result<(), PortalError> {
        self.delete(&format!("/patients/{}", id)).await
    }

    // Appointments

    pub async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, PortalError> {
        self.get_with("/appointments", query).await
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, PortalError> {
        self.get(&format!("/appointments/{}", id)).await
    }

    pub async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<Appointment, PortalError> {
        self.post("/appointments", request).await
    }

    pub async fn update_appointment(
        &self,
        id: Uuid,
        request: &UpdateAppointmentRequest,
    ) -> Result<Appointment, PortalError> {
        self.put(&format!("/appointments/{}", id), request).await
    }

    pub async fn delete_appointment(&self, id: Uuid) -> Result<(), PortalError> {
        self.delete(&format!("/appointments/{}", id)).await
    }

    // Prescriptions

    pub async fn list_prescriptions(&self, query: &PrescriptionQuery) -> Result<Vec<Prescription>, PortalError> {
        self.get_with("/prescriptions", query).await
    }

    pub async fn get_prescription(&self, id: Uuid) -> Result<Prescription, PortalError> {
        self.get(&format!("/prescriptions/{}", id)).await
    }

    pub async fn create_prescription(
        &self,
        request: &CreatePrescriptionRequest,
    ) -> Result<Prescription, PortalError> {
        self.post("/prescriptions", request).await
    }

    pub async fn update_prescription(
        &self,
        id: Uuid,
        request: &UpdatePrescriptionRequest,
    ) -> Result<Prescription, PortalError> {
        self.put(&format!("/prescriptions/{}", id), request).await
    }

    pub async fn delete_prescription(&self, id: Uuid) -> Result<(), PortalError> {
        self.delete(&format!("/prescriptions/{}", id)).await
    }
}

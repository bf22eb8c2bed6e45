//! Patient-facing booking funnel: branch, then doctor and slot, then patient
//! details, then a confirmation receipt.

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use appointment_cell::models::{Appointment, CreateAppointmentRequest};
use branch_cell::models::Branch;
use doctor_cell::models::Doctor;
use patient_cell::models::{is_valid_age, is_valid_phone, CreatePatientRequest, Gender, Patient};

use crate::api::ApiClient;
use crate::error::{FieldErrors, PortalError};

pub const CONFIRMATION_CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const BOOKING_FAILED_NOTICE: &str = "Error booking appointment. Please try again.";

/// Persistence calls the workflow makes on submit.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn find_patient_by_phone(&self, phone: &str) -> Result<Option<Patient>, PortalError>;

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PortalError>;

    async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment, PortalError>;
}

#[async_trait]
impl BookingGateway for ApiClient {
    async fn find_patient_by_phone(&self, phone: &str) -> Result<Option<Patient>, PortalError> {
        ApiClient::find_patient_by_phone(self, phone).await
    }

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PortalError> {
        ApiClient::create_patient(self, &request).await
    }

    async fn create_appointment(&self, request: CreateAppointmentRequest) -> Result<Appointment, PortalError> {
        ApiClient::create_appointment(self, &request).await
    }
}

/// Looks the patient up by phone and reuses that identity, otherwise
/// registers a new patient with an empty history.
pub async fn register_patient<G>(gateway: &G, request: CreatePatientRequest) -> Result<Patient, PortalError>
where
    G: BookingGateway + ?Sized,
{
    if let Some(existing) = gateway.find_patient_by_phone(&request.phone).await? {
        debug!("Reusing patient {} for phone {}", existing.id, request.phone);
        return Ok(existing);
    }
    gateway.create_patient(request).await
}

/// Raw form input. Age stays text until validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    pub name: String,
    pub phone: String,
    pub age: String,
    pub gender: Gender,
    pub address: String,
}

impl PatientForm {
    /// Validates every field and returns the complete error map on failure.
    pub fn validate(&self) -> Result<CreatePatientRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name", "Full Name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            errors.insert("phone", "Phone Number is required".to_string());
        } else if !is_valid_phone(&self.phone) {
            errors.insert("phone", "Phone must be 11 digits (e.g., 017...)".to_string());
        }
        let age = self.age.trim().parse::<u8>().ok().filter(|age| is_valid_age(*age));
        if age.is_none() {
            errors.insert("age", "Valid age is required".to_string());
        }
        if self.address.trim().is_empty() {
            errors.insert("address", "Address is required".to_string());
        }

        match age {
            Some(age) if errors.is_empty() => Ok(CreatePatientRequest {
                name: self.name.trim().to_string(),
                phone: self.phone.clone(),
                age,
                gender: self.gender,
                address: self.address.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub code: String,
    pub appointment: Appointment,
    pub patient: Patient,
    pub branch_name: String,
    pub doctor_name: String,
    pub slot: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub enum BookingStep {
    SelectBranch,
    SelectDoctor {
        branch: Branch,
        doctor: Option<Doctor>,
    },
    EnterDetails {
        branch: Branch,
        doctor: Doctor,
        slot: String,
    },
    Confirmed(Box<BookingReceipt>),
}

impl BookingStep {
    pub fn name(&self) -> &'static str {
        match self {
            BookingStep::SelectBranch => "select-branch",
            BookingStep::SelectDoctor { .. } => "select-doctor",
            BookingStep::EnterDetails { .. } => "enter-details",
            BookingStep::Confirmed(_) => "confirmed",
        }
    }

    /// 1-based position in the funnel.
    pub fn number(&self) -> u8 {
        match self {
            BookingStep::SelectBranch => 1,
            BookingStep::SelectDoctor { .. } => 2,
            BookingStep::EnterDetails { .. } => 3,
            BookingStep::Confirmed(_) => 4,
        }
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Cannot {action} during {step}")]
    OutOfOrder { action: &'static str, step: &'static str },

    #[error("Doctor does not practice at the selected branch")]
    DoctorNotInBranch,

    #[error("Pick a doctor first")]
    NoDoctorSelected,

    #[error("No slots available today")]
    NoSlots,

    #[error("Slot {0} is not available")]
    UnknownSlot(String),

    #[error("Please correct the highlighted fields")]
    Invalid(FieldErrors),

    #[error("Error booking appointment: {0}")]
    Failed(#[from] PortalError),
}

pub fn doctors_in_branch<'a>(doctors: &'a [Doctor], branch: &Branch) -> Vec<&'a Doctor> {
    doctors.iter().filter(|d| d.branch_id == branch.id).collect()
}

pub fn confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// One pass through the funnel. Forward moves happen one step at a time;
/// `back` returns to the previous step and `restart` to the first.
/// `submit` takes `&mut self`, so a second submission cannot start while one
/// is in flight.
pub struct BookingWorkflow<G: BookingGateway> {
    gateway: G,
    step: BookingStep,
    form: PatientForm,
    errors: FieldErrors,
    notice: Option<String>,
}

impl<G: BookingGateway> BookingWorkflow<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            step: BookingStep::SelectBranch,
            form: PatientForm::default(),
            errors: FieldErrors::new(),
            notice: None,
        }
    }

    pub fn step(&self) -> &BookingStep {
        &self.step
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PatientForm {
        &mut self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Failure notice from the last submit, if it failed after validation.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        match &self.step {
            BookingStep::Confirmed(receipt) => Some(receipt.as_ref()),
            _ => None,
        }
    }

    fn out_of_order(&self, action: &'static str) -> BookingError {
        BookingError::OutOfOrder {
            action,
            step: self.step.name(),
        }
    }

    pub fn select_branch(&mut self, branch: Branch) -> Result<(), BookingError> {
        if !matches!(self.step, BookingStep::SelectBranch) {
            return Err(self.out_of_order("select a branch"));
        }
        debug!("Booking branch selected: {}", branch.name);
        self.step = BookingStep::SelectDoctor { branch, doctor: None };
        Ok(())
    }

    pub fn select_doctor(&mut self, chosen: Doctor) -> Result<(), BookingError> {
        let BookingStep::SelectDoctor { branch, doctor } = &mut self.step else {
            return Err(self.out_of_order("select a doctor"));
        };
        if chosen.branch_id != branch.id {
            return Err(BookingError::DoctorNotInBranch);
        }
        *doctor = Some(chosen);
        Ok(())
    }

    /// Moves to the details step. Blocked while the chosen doctor has no slots.
    pub fn select_slot(&mut self, slot: &str) -> Result<(), BookingError> {
        let BookingStep::SelectDoctor { branch, doctor } = &self.step else {
            return Err(self.out_of_order("select a slot"));
        };
        let Some(doctor) = doctor else {
            return Err(BookingError::NoDoctorSelected);
        };
        if doctor.available_slots.is_empty() {
            return Err(BookingError::NoSlots);
        }
        if !doctor.available_slots.iter().any(|s| s == slot) {
            return Err(BookingError::UnknownSlot(slot.to_string()));
        }

        self.step = BookingStep::EnterDetails {
            branch: branch.clone(),
            doctor: doctor.clone(),
            slot: slot.to_string(),
        };
        Ok(())
    }

    /// Steps back once. The confirmation step only leaves through `restart`.
    pub fn back(&mut self) -> bool {
        let previous = match std::mem::replace(&mut self.step, BookingStep::SelectBranch) {
            BookingStep::SelectBranch => None,
            BookingStep::SelectDoctor { .. } => Some(BookingStep::SelectBranch),
            BookingStep::EnterDetails { branch, doctor, .. } => Some(BookingStep::SelectDoctor {
                branch,
                doctor: Some(doctor),
            }),
            confirmed @ BookingStep::Confirmed(_) => {
                self.step = confirmed;
                return false;
            }
        };
        match previous {
            Some(step) => {
                self.step = step;
                self.notice = None;
                true
            }
            None => false,
        }
    }

    pub fn restart(&mut self) {
        self.step = BookingStep::SelectBranch;
        self.form = PatientForm::default();
        self.errors.clear();
        self.notice = None;
    }

    /// Validates the form and, only if it is clean, registers the patient and
    /// books a pending appointment for `today`. Any failure leaves the
    /// workflow on the details step.
    pub async fn submit(&mut self, today: NaiveDate) -> Result<&BookingReceipt, BookingError> {
        let BookingStep::EnterDetails { branch, doctor, slot } = &self.step else {
            return Err(self.out_of_order("submit"));
        };

        self.notice = None;
        let request = match self.form.validate() {
            Ok(request) => {
                self.errors.clear();
                request
            }
            Err(errors) => {
                debug!("Booking form rejected: {:?}", errors.keys().collect::<Vec<_>>());
                self.errors = errors.clone();
                return Err(BookingError::Invalid(errors));
            }
        };

        let gateway = &self.gateway;
        let booked = async {
            let patient = register_patient(gateway, request).await?;
            let appointment = gateway
                .create_appointment(CreateAppointmentRequest {
                    patient_id: patient.id,
                    doctor_id: doctor.id,
                    branch_id: Some(branch.id),
                    date: today,
                    time: slot.clone(),
                    notes: None,
                })
                .await?;
            Ok::<_, PortalError>((patient, appointment))
        }
        .await;

        let (patient, appointment) = match booked {
            Ok(booked) => booked,
            Err(e) => {
                warn!("Booking failed: {}", e);
                self.notice = Some(BOOKING_FAILED_NOTICE.to_string());
                return Err(e.into());
            }
        };

        let receipt = BookingReceipt {
            code: confirmation_code(),
            appointment,
            patient,
            branch_name: branch.name.clone(),
            doctor_name: doctor.name.clone(),
            slot: slot.clone(),
            date: today,
        };
        info!("Booking {} confirmed as {}", receipt.appointment.id, receipt.code);

        self.step = BookingStep::Confirmed(Box::new(receipt));
        match &self.step {
            BookingStep::Confirmed(receipt) => Ok(receipt.as_ref()),
            _ => Err(self.out_of_order("read the receipt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use uuid::Uuid;

    use appointment_cell::models::AppointmentStatus;
    use branch_cell::models::ColorTheme;
    use doctor_cell::models::WeeklySchedule;
    use shared_models::auth::Role;

    fn branch() -> Branch {
        let now = Utc::now();
        Branch {
            id: Uuid::new_v4(),
            name: "MediNexus Central".to_string(),
            location: "Dhaka".to_string(),
            color_theme: ColorTheme::Blue,
            contact: "+8801700000001".to_string(),
            header_title: None,
            footer_text: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn doctor(branch: &Branch, slots: &[&str]) -> Doctor {
        let now = Utc::now();
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. A. Rahman".to_string(),
            email: "rahman@sr.com".to_string(),
            role: Role::Doctor,
            branch_id: branch.id,
            specialty: "Cardiology".to_string(),
            degree: "MBBS, FCPS".to_string(),
            schedule: WeeklySchedule::standard(),
            fees: 1000.0,
            available_slots: slots.iter().map(|s| s.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn patient_from(request: &CreatePatientRequest) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            phone: request.phone.clone(),
            age: request.age,
            gender: request.gender,
            address: request.address.clone(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn appointment_from(request: &CreateAppointmentRequest) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            patient_name: "John Doe".to_string(),
            patient_phone: "01711111111".to_string(),
            doctor_id: request.doctor_id,
            doctor_name: "Dr. A. Rahman".to_string(),
            branch_id: request.branch_id.unwrap_or_default(),
            date: request.date,
            time: request.time.clone(),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn fill(form: &mut PatientForm) {
        form.name = "John Doe".to_string();
        form.phone = "01711111111".to_string();
        form.age = "34".to_string();
        form.address = "123 Street".to_string();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at_details(gateway: MockBookingGateway) -> BookingWorkflow<MockBookingGateway> {
        let branch = branch();
        let doctor = doctor(&branch, &["10:00", "10:30"]);
        let mut workflow = BookingWorkflow::new(gateway);
        workflow.select_branch(branch).unwrap();
        workflow.select_doctor(doctor).unwrap();
        workflow.select_slot("10:30").unwrap();
        workflow
    }

    #[test]
    fn test_form_validation_collects_every_error() {
        let form = PatientForm {
            phone: "12345".to_string(),
            age: "abc".to_string(),
            ..Default::default()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["name"], "Full Name is required");
        assert_eq!(errors["phone"], "Phone must be 11 digits (e.g., 017...)");
        assert_eq!(errors["age"], "Valid age is required");
        assert_eq!(errors["address"], "Address is required");
    }

    #[test]
    fn test_form_age_bounds() {
        let mut form = PatientForm::default();
        fill(&mut form);

        for bad in ["0", "121", "-3", ""] {
            form.age = bad.to_string();
            assert!(form.validate().unwrap_err().contains_key("age"), "age {:?}", bad);
        }
        form.age = "120".to_string();
        assert_eq!(form.validate().unwrap().age, 120);
    }

    #[test]
    fn test_empty_phone_has_its_own_message() {
        let mut form = PatientForm::default();
        fill(&mut form);
        form.phone = "   ".to_string();

        assert_eq!(form.validate().unwrap_err()["phone"], "Phone Number is required");
    }

    #[test]
    fn test_confirmation_code_shape() {
        for _ in 0..50 {
            let code = confirmation_code();
            assert_eq!(code.len(), CONFIRMATION_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_doctors_in_branch() {
        let central = branch();
        let north = branch();
        let doctors = vec![doctor(&central, &["10:00"]), doctor(&north, &[]), doctor(&central, &[])];

        assert_eq!(doctors_in_branch(&doctors, &central).len(), 2);
        assert_eq!(doctors_in_branch(&doctors, &north)[0].branch_id, north.id);
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let branch = branch();
        let doctor = doctor(&branch, &["10:00"]);
        let mut workflow = BookingWorkflow::new(MockBookingGateway::new());

        assert_matches!(workflow.select_doctor(doctor.clone()), Err(BookingError::OutOfOrder { .. }));
        assert_matches!(workflow.select_slot("10:00"), Err(BookingError::OutOfOrder { .. }));

        workflow.select_branch(branch.clone()).unwrap();
        assert_matches!(workflow.select_branch(branch), Err(BookingError::OutOfOrder { .. }));
        assert_matches!(workflow.select_slot("10:00"), Err(BookingError::NoDoctorSelected));
        assert_eq!(workflow.step().number(), 2);
    }

    #[test]
    fn test_doctor_must_belong_to_branch() {
        let central = branch();
        let elsewhere = doctor(&branch(), &["10:00"]);
        let mut workflow = BookingWorkflow::new(MockBookingGateway::new());
        workflow.select_branch(central).unwrap();

        assert_matches!(workflow.select_doctor(elsewhere), Err(BookingError::DoctorNotInBranch));
    }

    #[test]
    fn test_doctor_without_slots_blocks_progress() {
        let branch = branch();
        let booked_out = doctor(&branch, &[]);
        let mut workflow = BookingWorkflow::new(MockBookingGateway::new());
        workflow.select_branch(branch).unwrap();
        workflow.select_doctor(booked_out).unwrap();

        assert_matches!(workflow.select_slot("10:00"), Err(BookingError::NoSlots));
        assert_eq!(workflow.step().name(), "select-doctor");
    }

    #[test]
    fn test_unknown_slot_is_rejected() {
        let branch = branch();
        let doctor = doctor(&branch, &["10:00"]);
        let mut workflow = BookingWorkflow::new(MockBookingGateway::new());
        workflow.select_branch(branch).unwrap();
        workflow.select_doctor(doctor).unwrap();

        assert_matches!(workflow.select_slot("15:00"), Err(BookingError::UnknownSlot(s)) if s == "15:00");
    }

    #[test]
    fn test_back_walks_one_step_and_keeps_doctor() {
        let mut workflow = at_details(MockBookingGateway::new());

        assert!(workflow.back());
        assert_matches!(workflow.step(), BookingStep::SelectDoctor { doctor: Some(_), .. });
        assert!(workflow.back());
        assert_matches!(workflow.step(), BookingStep::SelectBranch);
        assert!(!workflow.back());
    }

    #[tokio::test]
    async fn test_invalid_phone_makes_no_calls() {
        let mut gateway = MockBookingGateway::new();
        gateway.expect_find_patient_by_phone().never();
        gateway.expect_create_patient().never();
        gateway.expect_create_appointment().never();

        let mut workflow = at_details(gateway);
        fill(workflow.form_mut());
        workflow.form_mut().phone = "12345".to_string();

        let result = workflow.submit(today()).await;
        assert_matches!(result, Err(BookingError::Invalid(errors)) if errors.contains_key("phone"));
        assert_eq!(workflow.errors().len(), 1);
        assert_eq!(workflow.step().name(), "enter-details");
    }

    #[tokio::test]
    async fn test_errors_are_recomputed_on_each_submit() {
        let mut gateway = MockBookingGateway::new();
        gateway.expect_find_patient_by_phone().never();

        let mut workflow = at_details(gateway);
        let _ = workflow.submit(today()).await;
        assert_eq!(workflow.errors().len(), 4);

        fill(workflow.form_mut());
        workflow.form_mut().address = String::new();
        let _ = workflow.submit(today()).await;
        assert_eq!(workflow.errors().keys().copied().collect::<Vec<_>>(), vec!["address"]);
    }

    #[tokio::test]
    async fn test_submit_registers_new_patient_and_books_pending() {
        let mut gateway = MockBookingGateway::new();
        gateway
            .expect_find_patient_by_phone()
            .withf(|phone| phone.to_string() == "01711111111")
            .times(1)
            .returning(|_| Ok(None));
        gateway
            .expect_create_patient()
            .times(1)
            .returning(|request| Ok(patient_from(&request)));
        gateway
            .expect_create_appointment()
            .withf(|request| request.time == "10:30" && request.date == NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
            .times(1)
            .returning(|request| Ok(appointment_from(&request)));

        let mut workflow = at_details(gateway);
        fill(workflow.form_mut());

        let receipt = workflow.submit(today()).await.unwrap().clone();
        assert_eq!(receipt.slot, "10:30");
        assert_eq!(receipt.branch_name, "MediNexus Central");
        assert_eq!(receipt.appointment.status, AppointmentStatus::Pending);
        assert_eq!(receipt.appointment.patient_id, receipt.patient.id);
        assert_eq!(receipt.code.len(), 6);
        assert_eq!(workflow.step().number(), 4);
        assert!(!workflow.back());
    }

    #[tokio::test]
    async fn test_submit_reuses_patient_with_same_phone() {
        let existing = patient_from(&CreatePatientRequest {
            name: "John Doe".to_string(),
            phone: "01711111111".to_string(),
            age: 34,
            gender: Gender::Male,
            address: "123 Street".to_string(),
        });
        let existing_id = existing.id;

        let mut gateway = MockBookingGateway::new();
        gateway
            .expect_find_patient_by_phone()
            .returning(move |_| Ok(Some(existing.clone())));
        gateway.expect_create_patient().never();
        gateway
            .expect_create_appointment()
            .withf(move |request| request.patient_id == existing_id)
            .returning(|request| Ok(appointment_from(&request)));

        let mut workflow = at_details(gateway);
        fill(workflow.form_mut());

        let receipt = workflow.submit(today()).await.unwrap();
        assert_eq!(receipt.patient.id, existing_id);
    }

    #[tokio::test]
    async fn test_failed_booking_stays_on_details_with_notice() {
        let mut gateway = MockBookingGateway::new();
        gateway.expect_find_patient_by_phone().returning(|_| Ok(None));
        gateway
            .expect_create_patient()
            .returning(|request| Ok(patient_from(&request)));
        gateway
            .expect_create_appointment()
            .returning(|_| Err(PortalError::Server { status: 500, message: "boom".to_string() }));

        let mut workflow = at_details(gateway);
        fill(workflow.form_mut());

        let result = workflow.submit(today()).await;
        assert_matches!(result, Err(BookingError::Failed(PortalError::Server { status: 500, .. })));
        assert_eq!(workflow.step().name(), "enter-details");
        assert_eq!(workflow.notice(), Some(BOOKING_FAILED_NOTICE));
        assert!(workflow.receipt().is_none());
    }

    #[tokio::test]
    async fn test_restart_clears_everything() {
        let mut workflow = at_details(MockBookingGateway::new());
        fill(workflow.form_mut());
        workflow.form_mut().phone = "1".to_string();
        let _ = workflow.submit(today()).await;

        workflow.restart();
        assert_eq!(workflow.step().number(), 1);
        assert!(workflow.errors().is_empty());
        assert_eq!(workflow.form(), &PatientForm::default());
    }
}

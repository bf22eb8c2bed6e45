use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use appointment_cell::AppointmentService;
use branch_cell::models::{ColorTheme, CreateBranchRequest};
use branch_cell::BranchService;
use doctor_cell::models::{CreateDoctorRequest, Doctor, WeeklySchedule};
use doctor_cell::DoctorService;
use patient_cell::models::{CreatePatientRequest, Gender, Patient, UpdatePatientRequest};
use patient_cell::PatientService;
use shared_database::AppState;
use shared_models::{auth::User, error::AppError};
use shared_utils::extractor::ValidJson;
use shared_utils::test_utils::{TestConfig, TestUser};

struct Fixture {
    state: Arc<AppState>,
    doctor: Doctor,
    patient: Patient,
}

async fn fixture() -> Fixture {
    let state = Arc::new(AppState::new(TestConfig::default().to_app_config()));

    let branch = BranchService::new(&state)
        .create_branch(CreateBranchRequest {
            name: "MediNexus Central".to_string(),
            location: "Dhaka, Dhanmondi".to_string(),
            color_theme: ColorTheme::Blue,
            contact: "+8801700000001".to_string(),
            header_title: None,
            footer_text: None,
        })
        .await
        .unwrap();

    let doctor = DoctorService::new(&state)
        .create_doctor(CreateDoctorRequest {
            name: "Dr. A. Rahman".to_string(),
            email: "rahman@sr.com".to_string(),
            branch_id: branch.id,
            specialty: "Cardiology".to_string(),
            degree: "MBBS, FCPS".to_string(),
            schedule: WeeklySchedule::every_day("10:00", "14:00"),
            fees: 1000.0,
            password: None,
        })
        .await
        .unwrap();

    let patient = PatientService::new(&state)
        .create_patient(CreatePatientRequest {
            name: "John Doe".to_string(),
            phone: "01711111111".to_string(),
            age: 34,
            gender: Gender::Male,
            address: "123 Street".to_string(),
        })
        .await
        .unwrap();

    Fixture { state, doctor, patient }
}

fn employee() -> Extension<User> {
    Extension(TestUser::employee("sarah@sr.com").to_user())
}

fn visit_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn booking(f: &Fixture) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id: f.patient.id,
        doctor_id: f.doctor.id,
        branch_id: None,
        date: visit_day(),
        time: "10:30".to_string(),
        notes: None,
    }
}

async fn book(f: &Fixture) -> Appointment {
    let (status, body) = book_appointment(State(f.state.clone()), employee(), ValidJson(booking(f)))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(body.0).unwrap()
}

async fn set_status(f: &Fixture, id: Uuid, status: AppointmentStatus) -> Result<Appointment, AppError> {
    update_appointment(
        State(f.state.clone()),
        employee(),
        Path(id.to_string()),
        ValidJson(UpdateAppointmentRequest::status(status)),
    )
    .await
    .map(|body| serde_json::from_value(body.0).unwrap())
}

#[tokio::test]
async fn test_booking_starts_pending_with_denormalized_names() {
    let f = fixture().await;
    let appointment = book(&f).await;

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.patient_name, "John Doe");
    assert_eq!(appointment.patient_phone, "01711111111");
    assert_eq!(appointment.doctor_name, "Dr. A. Rahman");
    assert_eq!(appointment.branch_id, f.doctor.branch_id);
}

#[tokio::test]
async fn test_booking_json_shape() {
    let f = fixture().await;
    let (_, body) = book_appointment(State(f.state.clone()), employee(), ValidJson(booking(&f)))
        .await
        .unwrap();

    assert_eq!(body.0["status"], "pending");
    assert_eq!(body.0["date"], "2024-06-10");
    assert_eq!(body.0["time"], "10:30");
    assert_eq!(body.0["patientName"], "John Doe");
}

#[tokio::test]
async fn test_booking_appends_patient_history() {
    let f = fixture().await;
    let first = book(&f).await;
    let second = book(&f).await;

    let patient = PatientService::new(&f.state).get_patient(f.patient.id).await.unwrap();
    assert_eq!(patient.history, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_denormalized_names_do_not_follow_renames() {
    let f = fixture().await;
    let appointment = book(&f).await;

    PatientService::new(&f.state)
        .update_patient(
            f.patient.id,
            UpdatePatientRequest {
                name: Some("John Q. Doe".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = AppointmentService::new(&f.state)
        .get_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(stored.patient_name, "John Doe");
}

#[tokio::test]
async fn test_booking_unknown_references() {
    let f = fixture().await;

    let mut request = booking(&f);
    request.patient_id = Uuid::new_v4();
    let result = book_appointment(State(f.state.clone()), employee(), ValidJson(request)).await;
    assert_matches!(result, Err(AppError::NotFound(msg)) if msg == "Patient not found");

    let mut request = booking(&f);
    request.doctor_id = Uuid::new_v4();
    let result = book_appointment(State(f.state.clone()), employee(), ValidJson(request)).await;
    assert_matches!(result, Err(AppError::NotFound(msg)) if msg == "Doctor not found");

    let mut request = booking(&f);
    request.branch_id = Some(Uuid::new_v4());
    let result = book_appointment(State(f.state.clone()), employee(), ValidJson(request)).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));

    let mut request = booking(&f);
    request.time = "half past ten".to_string();
    let result = book_appointment(State(f.state), employee(), ValidJson(request)).await;
    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_staff_confirm_then_cannot_cancel_or_complete() {
    let f = fixture().await;
    let appointment = book(&f).await;

    let confirmed = set_status(&f, appointment.id, AppointmentStatus::Confirmed).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let same_again = set_status(&f, appointment.id, AppointmentStatus::Confirmed).await.unwrap();
    assert_eq!(same_again.status, AppointmentStatus::Confirmed);

    let cancel = set_status(&f, appointment.id, AppointmentStatus::Cancelled).await;
    assert_matches!(cancel, Err(AppError::BadRequest(_)));

    let complete = set_status(&f, appointment.id, AppointmentStatus::Completed).await;
    assert_matches!(complete, Err(AppError::BadRequest(msg)) if msg.contains("completed"));
}

#[tokio::test]
async fn test_cancelled_is_terminal() {
    let f = fixture().await;
    let appointment = book(&f).await;

    set_status(&f, appointment.id, AppointmentStatus::Cancelled).await.unwrap();
    let result = set_status(&f, appointment.id, AppointmentStatus::Confirmed).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_doctor_cannot_change_status() {
    let f = fixture().await;
    let appointment = book(&f).await;
    let doctor = Extension(TestUser::doctor("rahman@sr.com").with_id(f.doctor.id).to_user());

    let result = update_appointment(
        State(f.state.clone()),
        doctor,
        Path(appointment.id.to_string()),
        ValidJson(UpdateAppointmentRequest::status(AppointmentStatus::Confirmed)),
    )
    .await;
    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_completion_is_only_reached_through_service() {
    let f = fixture().await;
    let appointment = book(&f).await;
    let service = AppointmentService::new(&f.state);

    let completed = service.complete_appointment(appointment.id).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    assert_matches!(
        service.complete_appointment(appointment.id).await,
        Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Completed, .. })
    );
    assert_matches!(
        service.ensure_completable(Uuid::new_v4()).await,
        Err(AppointmentError::NotFound)
    );
}

#[tokio::test]
async fn test_search_appointments_filters() {
    let f = fixture().await;
    let first = book(&f).await;
    book(&f).await;
    set_status(&f, first.id, AppointmentStatus::Confirmed).await.unwrap();

    let query = AppointmentQuery {
        doctor_id: Some(f.doctor.id.to_string()),
        status: Some("confirmed".to_string()),
        ..Default::default()
    };
    let body = search_appointments(State(f.state.clone()), employee(), Query(query))
        .await
        .unwrap();
    let found: Vec<Appointment> = serde_json::from_value(body.0).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, first.id);

    let query = AppointmentQuery {
        date: Some("2024-06-10".to_string()),
        patient_id: Some(f.patient.id.to_string()),
        ..Default::default()
    };
    let body = search_appointments(State(f.state.clone()), employee(), Query(query))
        .await
        .unwrap();
    assert_eq!(body.0.as_array().unwrap().len(), 2);

    let query = AppointmentQuery {
        status: Some("archived".to_string()),
        ..Default::default()
    };
    let body = search_appointments(State(f.state), employee(), Query(query))
        .await
        .unwrap();
    assert_eq!(body.0.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_appointment() {
    let f = fixture().await;
    let appointment = book(&f).await;

    let body = delete_appointment(State(f.state.clone()), employee(), Path(appointment.id.to_string()))
        .await
        .unwrap();
    assert_eq!(body.0["message"], "Appointment deleted");

    let missing = get_appointment(State(f.state), employee(), Path(appointment.id.to_string())).await;
    assert_matches!(missing, Err(AppError::NotFound(_)));
}

//! Demo data loaded at startup when `SEED_DEMO_DATA` is on.

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use appointment_cell::models::{AppointmentStatus, CreateAppointmentRequest, UpdateAppointmentRequest};
use appointment_cell::AppointmentService;
use auth_cell::models::NewAccount;
use auth_cell::AccountService;
use branch_cell::models::{Branch, ColorTheme, CreateBranchRequest};
use branch_cell::BranchService;
use doctor_cell::models::{CreateDoctorRequest, DayLabel, Doctor, ScheduleDay, WeeklySchedule};
use doctor_cell::DoctorService;
use patient_cell::models::{CreatePatientRequest, Gender, Patient};
use patient_cell::PatientService;
use shared_database::AppState;
use shared_models::auth::Role;

pub const DEMO_PASSWORD: &str = "password";

fn branch(name: &str, location: &str, theme: ColorTheme, contact: &str, header: &str, footer: &str) -> CreateBranchRequest {
    CreateBranchRequest {
        name: name.to_string(),
        location: location.to_string(),
        color_theme: theme,
        contact: contact.to_string(),
        header_title: Some(header.to_string()),
        footer_text: Some(footer.to_string()),
    }
}

fn doctor(
    branch: &Branch,
    name: &str,
    email: &str,
    specialty: &str,
    degree: &str,
    fees: f64,
    schedule: WeeklySchedule,
) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: name.to_string(),
        email: email.to_string(),
        branch_id: branch.id,
        specialty: specialty.to_string(),
        degree: degree.to_string(),
        schedule,
        fees,
        password: Some(DEMO_PASSWORD.to_string()),
    }
}

fn patient(name: &str, phone: &str, age: u8, gender: Gender, address: &str) -> CreatePatientRequest {
    CreatePatientRequest {
        name: name.to_string(),
        phone: phone.to_string(),
        age,
        gender,
        address: address.to_string(),
    }
}

async fn book(
    appointments: &AppointmentService,
    patient: &Patient,
    doctor: &Doctor,
    today: NaiveDate,
    time: &str,
) -> anyhow::Result<Uuid> {
    let appointment = appointments
        .book_appointment(CreateAppointmentRequest {
            patient_id: patient.id,
            doctor_id: doctor.id,
            branch_id: Some(doctor.branch_id),
            date: today,
            time: time.to_string(),
            notes: None,
        })
        .await
        .with_context(|| format!("booking {} with {}", patient.name, doctor.name))?;
    Ok(appointment.id)
}

/// Seeds branches, staff logins, doctors, patients and two appointments for
/// `today`. Every login uses [`DEMO_PASSWORD`].
pub async fn seed_demo_data(state: &AppState, today: NaiveDate) -> anyhow::Result<()> {
    let branches = BranchService::new(state);
    let accounts = AccountService::new(state);
    let doctors = DoctorService::for_day(state, today);
    let patients = PatientService::new(state);
    let appointments = AppointmentService::new(state);

    let central = branches
        .create_branch(branch(
            "MediNexus Central",
            "Dhaka, Dhanmondi",
            ColorTheme::Blue,
            "+8801700000001",
            "MediNexus Central Hospital",
            "© 2024 MediNexus Central - Excellence in Care",
        ))
        .await?;
    let north = branches
        .create_branch(branch(
            "MediNexus North",
            "Dhaka, Uttara",
            ColorTheme::Emerald,
            "+8801700000002",
            "MediNexus North Care",
            "© 2024 MediNexus North - Your Health, Our Priority",
        ))
        .await?;
    branches
        .create_branch(branch(
            "MediNexus South",
            "Chittagong, GEC",
            ColorTheme::Indigo,
            "+8801700000003",
            "MediNexus Chittagong",
            "© 2024 MediNexus South - Serving the Port City",
        ))
        .await?;

    accounts
        .create_account(NewAccount {
            id: None,
            name: "Super Admin".to_string(),
            email: "admin@sr.com".to_string(),
            password: DEMO_PASSWORD.to_string(),
            role: Role::Admin,
            branch_id: "all".to_string(),
        })
        .await
        .context("seeding admin account")?;
    accounts
        .create_account(NewAccount {
            id: None,
            name: "Receptionist Sarah".to_string(),
            email: "sarah@sr.com".to_string(),
            password: DEMO_PASSWORD.to_string(),
            role: Role::Employee,
            branch_id: central.id.to_string(),
        })
        .await
        .context("seeding employee account")?;

    let rahman = doctors
        .create_doctor(doctor(
            &central,
            "Dr. A. Rahman",
            "rahman@sr.com",
            "Cardiology",
            "MBBS, FCPS",
            1000.0,
            WeeklySchedule::standard(),
        ))
        .await?;

    let mut evenings = WeeklySchedule::standard();
    evenings.set(DayLabel::Sun, ScheduleDay::working("16:00", "20:00"));
    doctors
        .create_doctor(doctor(&north, "Dr. S. Khan", "khan@sr.com", "Neurology", "MBBS, MD", 1200.0, evenings))
        .await?;

    let mut early_monday = WeeklySchedule::standard();
    early_monday.set(DayLabel::Mon, ScheduleDay::working("09:00", "12:00"));
    doctors
        .create_doctor(doctor(
            &central,
            "Dr. F. Ahmed",
            "ahmed@sr.com",
            "General Medicine",
            "MBBS",
            500.0,
            early_monday,
        ))
        .await?;

    let john = patients
        .create_patient(patient("John Doe", "01711111111", 34, Gender::Male, "123 Street"))
        .await?;
    let jane = patients
        .create_patient(patient("Jane Smith", "01722222222", 28, Gender::Female, "456 Avenue"))
        .await?;

    let confirmed = book(&appointments, &john, &rahman, today, "10:30").await?;
    appointments
        .update_appointment(confirmed, UpdateAppointmentRequest::status(AppointmentStatus::Confirmed))
        .await?;
    book(&appointments, &jane, &rahman, today, "11:00").await?;

    info!("Demo data seeded: 3 branches, 3 doctors, 2 patients, 2 appointments");
    Ok(())
}

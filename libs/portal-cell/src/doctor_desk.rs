//! Doctor's queue, patient lookup and the prescription composer.

use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::models::Appointment;
use appointment_cell::AppointmentLifecycleService;
use patient_cell::models::Patient;
use prescription_cell::models::{CreatePrescriptionRequest, MedicineInput, MedicineType};

pub const SAVED_NOTICE: &str = "Prescription Saved & Sent to Print Queue";

/// The doctor's own pending or confirmed appointments, i.e. the visits a
/// prescription can still complete.
pub fn my_queue<'a, I>(appointments: I, doctor_id: Uuid) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let lifecycle = AppointmentLifecycleService::new();
    appointments
        .into_iter()
        .filter(|apt| apt.doctor_id == doctor_id && lifecycle.can_complete(apt.status))
        .collect()
}

/// An empty query lists nobody.
pub fn search_patients<'a, I>(patients: I, query: &str) -> Vec<&'a Patient>
where
    I: IntoIterator<Item = &'a Patient>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }
    patients.into_iter().filter(|p| p.matches(query)).collect()
}

/// What a saved prescription is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentLink {
    Visit(Uuid),
    /// Written outside any booked visit.
    Orphan,
}

impl AppointmentLink {
    pub fn appointment_id(&self) -> Option<Uuid> {
        match self {
            AppointmentLink::Visit(id) => Some(*id),
            AppointmentLink::Orphan => None,
        }
    }
}

/// Links to the first queued visit of the patient, if any.
pub fn link_for(queue: &[&Appointment], patient_id: Uuid) -> AppointmentLink {
    queue
        .iter()
        .find(|apt| apt.patient_id == patient_id)
        .map_or(AppointmentLink::Orphan, |apt| AppointmentLink::Visit(apt.id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicineField {
    Name(String),
    Kind(MedicineType),
    Dosage(String),
    Duration(String),
}

pub fn blank_medicine() -> MedicineInput {
    MedicineInput {
        id: None,
        name: String::new(),
        kind: MedicineType::Tablet,
        dosage: "1-0-1".to_string(),
        duration: "5 days".to_string(),
    }
}

/// Draft prescription for one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionComposer {
    patient_id: Uuid,
    medicines: Vec<MedicineInput>,
    tests: Vec<String>,
    notes: String,
}

impl PrescriptionComposer {
    pub fn new(patient_id: Uuid) -> Self {
        Self {
            patient_id,
            medicines: Vec::new(),
            tests: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn medicines(&self) -> &[MedicineInput] {
        &self.medicines
    }

    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Appends a blank row and returns its index.
    pub fn add_medicine(&mut self) -> usize {
        self.medicines.push(blank_medicine());
        self.medicines.len() - 1
    }

    /// Returns `false` when `index` is out of range.
    pub fn update_medicine(&mut self, index: usize, field: MedicineField) -> bool {
        let Some(medicine) = self.medicines.get_mut(index) else {
            return false;
        };
        match field {
            MedicineField::Name(name) => medicine.name = name,
            MedicineField::Kind(kind) => medicine.kind = kind,
            MedicineField::Dosage(dosage) => medicine.dosage = dosage,
            MedicineField::Duration(duration) => medicine.duration = duration,
        }
        true
    }

    pub fn remove_medicine(&mut self, index: usize) -> Option<MedicineInput> {
        (index < self.medicines.len()).then(|| self.medicines.remove(index))
    }

    pub fn add_test(&mut self, test: &str) {
        let test = test.trim();
        if !test.is_empty() {
            self.tests.push(test.to_string());
        }
    }

    pub fn remove_test(&mut self, index: usize) -> Option<String> {
        (index < self.tests.len()).then(|| self.tests.remove(index))
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Request for saving the draft. The signature is left to the server,
    /// which signs with the doctor's name and the date.
    pub fn to_request(&self, doctor_id: Uuid, link: AppointmentLink, today: NaiveDate) -> CreatePrescriptionRequest {
        CreatePrescriptionRequest {
            appointment_id: link.appointment_id(),
            patient_id: Some(self.patient_id),
            doctor_id: Some(doctor_id),
            date: Some(today),
            medicines: self.medicines.clone(),
            tests: self.tests.clone(),
            notes: self.notes.clone(),
            digital_signature: None,
        }
    }

    /// Clears the draft after a successful save.
    pub fn reset(&mut self) {
        self.medicines.clear();
        self.tests.clear();
        self.notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointment_cell::models::AppointmentStatus;
    use chrono::Utc;
    use patient_cell::models::Gender;

    fn appointment(doctor_id: Uuid, patient_id: Uuid, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            patient_name: "John Doe".to_string(),
            patient_phone: "01711111111".to_string(),
            doctor_id,
            doctor_name: "Dr. A. Rahman".to_string(),
            branch_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: "10:00".to_string(),
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn patient(name: &str, phone: &str) -> Patient {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            age: 40,
            gender: Gender::Female,
            address: "Dhaka".to_string(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_queue_is_own_and_completable() {
        let me = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let all = vec![
            appointment(me, patient_id, AppointmentStatus::Pending),
            appointment(me, patient_id, AppointmentStatus::Completed),
            appointment(Uuid::new_v4(), patient_id, AppointmentStatus::Confirmed),
            appointment(me, patient_id, AppointmentStatus::Cancelled),
            appointment(me, patient_id, AppointmentStatus::Confirmed),
        ];

        let queue = my_queue(&all, me);
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|apt| apt.doctor_id == me));
        assert!(queue
            .iter()
            .all(|apt| matches!(apt.status, AppointmentStatus::Pending | AppointmentStatus::Confirmed)));
    }

    #[test]
    fn test_link_skips_cancelled_visit() {
        let me = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let all = vec![
            appointment(me, patient_id, AppointmentStatus::Cancelled),
            appointment(me, patient_id, AppointmentStatus::Pending),
        ];
        let queue = my_queue(&all, me);

        assert_eq!(link_for(&queue, patient_id), AppointmentLink::Visit(all[1].id));
    }

    #[test]
    fn test_only_cancelled_visit_saves_as_orphan() {
        let me = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let all = vec![appointment(me, patient_id, AppointmentStatus::Cancelled)];

        assert_eq!(link_for(&my_queue(&all, me), patient_id), AppointmentLink::Orphan);
    }

    #[test]
    fn test_link_prefers_first_queued_visit() {
        let me = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        let all = vec![
            appointment(me, patient_id, AppointmentStatus::Confirmed),
            appointment(me, patient_id, AppointmentStatus::Pending),
        ];
        let queue = my_queue(&all, me);

        assert_eq!(link_for(&queue, patient_id), AppointmentLink::Visit(all[0].id));
        assert_eq!(link_for(&queue, Uuid::new_v4()), AppointmentLink::Orphan);
    }

    #[test]
    fn test_patient_search() {
        let all = vec![patient("Jane Roe", "01822222222"), patient("John Doe", "01711111111")];
        assert!(search_patients(&all, "  ").is_empty());
        assert_eq!(search_patients(&all, "JANE")[0].name, "Jane Roe");
        assert_eq!(search_patients(&all, "0171")[0].name, "John Doe");
    }

    #[test]
    fn test_composer_rows() {
        let mut composer = PrescriptionComposer::new(Uuid::new_v4());
        let first = composer.add_medicine();
        let second = composer.add_medicine();

        assert_eq!(composer.medicines()[first], blank_medicine());
        assert!(composer.update_medicine(second, MedicineField::Name("Napa".to_string())));
        assert!(composer.update_medicine(second, MedicineField::Kind(MedicineType::Syrup)));
        assert!(!composer.update_medicine(7, MedicineField::Dosage("0-0-1".to_string())));

        let removed = composer.remove_medicine(first).unwrap();
        assert_eq!(removed.name, "");
        assert_eq!(composer.medicines().len(), 1);
        assert_eq!(composer.medicines()[0].name, "Napa");
        assert_eq!(composer.medicines()[0].kind, MedicineType::Syrup);
        assert!(composer.remove_medicine(3).is_none());
    }

    #[test]
    fn test_orphan_request_has_no_appointment() {
        let patient_id = Uuid::new_v4();
        let doctor_id = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut composer = PrescriptionComposer::new(patient_id);
        composer.add_test("CBC");
        composer.add_test("   ");
        composer.add_test("Lipid profile");
        assert_eq!(composer.remove_test(1).as_deref(), Some("Lipid profile"));
        assert!(composer.remove_test(5).is_none());
        composer.set_notes("Rest well");

        let request = composer.to_request(doctor_id, AppointmentLink::Orphan, today);
        assert_eq!(request.appointment_id, None);
        assert_eq!(request.patient_id, Some(patient_id));
        assert_eq!(request.doctor_id, Some(doctor_id));
        assert_eq!(request.tests, vec!["CBC".to_string()]);
        assert_eq!(request.notes, "Rest well");

        composer.reset();
        assert!(composer.tests().is_empty());
        assert_eq!(composer.notes(), "");
    }
}

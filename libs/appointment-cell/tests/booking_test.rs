use std::fs;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::{tempdir, TempDir};

use appointment_cell::models::{AppointmentStatus, BookAppointmentRequest, BookingError};
use appointment_cell::services::BookingService;
use notification_cell::services::{OutboxMailer, ReminderScheduler};
use patient_cell::services::PatientDirectory;
use scheduling_cell::models::{BookingRequest, DoctorPreference, SchedulingError, Slot};
use scheduling_cell::services::{SlotAllocator, SlotCatalog};
use shared_config::AppConfig;

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn dob(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn slot(doctor_id: &str, doctor_name: &str, start: &str, end: &str) -> Slot {
    Slot {
        doctor_id: doctor_id.to_string(),
        doctor_name: doctor_name.to_string(),
        slot_start: ts(start),
        slot_end: ts(end),
        available: true,
    }
}

struct TestClinic {
    _dir: TempDir,
    config: AppConfig,
    catalog: Arc<SlotCatalog>,
    allocator: Arc<SlotAllocator>,
    patients: Arc<PatientDirectory>,
    reminders: Arc<ReminderScheduler>,
    booking: BookingService,
}

async fn clinic_with(slots: Vec<Slot>) -> TestClinic {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let config = AppConfig {
        data_dir: root.join("data"),
        templates_dir: root.join("templates"),
        outbox_dir: root.join("outbox"),
        exports_dir: root.join("exports"),
        forms_dir: root.join("forms"),
    };
    config.ensure_dirs().unwrap();

    fs::create_dir_all(&config.templates_dir).unwrap();
    fs::write(
        config.templates_dir.join("email_confirm.txt"),
        "Subject: Appointment Confirmed\n\nHi {first_name}, you are booked with {doctor_name} on {slot_date} at {slot_time}, {clinic_location}.",
    )
    .unwrap();
    fs::write(
        config.templates_dir.join("email_intake_form.txt"),
        "Subject: Intake Form\n\nHi {first_name}, please fill the attached form before your visit with {doctor_name}.",
    )
    .unwrap();

    let catalog = Arc::new(SlotCatalog::open(config.schedule_path()).unwrap());
    catalog.replace_all(slots).await.unwrap();

    let allocator = Arc::new(SlotAllocator::new(catalog.clone()));
    let patients = Arc::new(PatientDirectory::open(config.patients_path()).unwrap());
    let mailer = Arc::new(OutboxMailer::new(&config));
    let reminders =
        Arc::new(ReminderScheduler::open(config.reminders_path(), mailer.clone()).unwrap());
    let booking = BookingService::new(
        &config,
        allocator.clone(),
        patients.clone(),
        reminders.clone(),
        mailer,
    )
    .unwrap();

    TestClinic {
        _dir: dir,
        config,
        catalog,
        allocator,
        patients,
        reminders,
        booking,
    }
}

fn book_request(candidate: scheduling_cell::models::SlotCandidate) -> BookAppointmentRequest {
    BookAppointmentRequest {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        dob: dob("1990-01-01"),
        email: Some("asha@example.com".to_string()),
        clinic_location: "Main Clinic - Bengaluru".to_string(),
        insurance_carrier: "Acme Health".to_string(),
        member_id: "M-1001".to_string(),
        group_number: "G-7".to_string(),
        candidate,
    }
}

#[tokio::test]
async fn new_patient_booking_runs_the_full_flow() {
    let clinic = clinic_with(vec![
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:00", "2024-01-08 09:30"),
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:30", "2024-01-08 10:00"),
    ])
    .await;

    // New patient, so the policy demands the hour-long candidate.
    let request = BookingRequest {
        doctor: DoctorPreference::Doctor("D1".to_string()),
        duration_minutes: 60,
    };
    let candidate = clinic
        .allocator
        .find_candidates(&request)
        .await
        .unwrap()
        .remove(0);

    let confirmation = clinic.booking.book(book_request(candidate)).await.unwrap();

    let record = &confirmation.appointment;
    assert_eq!(record.patient_name, "Asha Verma");
    assert_eq!(record.patient_type.as_str(), "new");
    assert_eq!(record.doctor_id, "D1");
    assert_eq!(record.slot_start, ts("2024-01-08 09:00"));
    assert_eq!(record.slot_end, ts("2024-01-08 10:00"));
    assert_eq!(record.status, AppointmentStatus::Booked);
    assert!(record.confirmation_sent);
    assert!(record.intake_form_sent);

    // The patient now has a record on file.
    let roster = clinic.patients.all_patients().await;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].patient_id, record.patient_id);

    // Both underlying slots are blocked.
    assert!(clinic.catalog.snapshot().await.iter().all(|s| !s.available));

    // Three reminders, all unfired.
    assert_eq!(confirmation.reminders_scheduled, 3);
    let plan = clinic.reminders.all_reminders().await;
    assert_eq!(plan.len(), 3);
    assert!(plan.iter().all(|r| r.sent_at.is_none()));
    assert!(plan.iter().all(|r| r.appointment_id == record.appointment_id));

    // Confirmation + intake form landed in the outbox.
    let outbox: Vec<_> = fs::read_dir(&clinic.config.outbox_dir)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(outbox.len(), 2);

    // Calendar file written to exports.
    let calendar = confirmation.calendar_file.expect("ics file");
    assert!(calendar.exists());

    // The appointment row landed in the table.
    let persisted = clinic.booking.all_appointments().await;
    assert_eq!(persisted.len(), 1);
}

#[tokio::test]
async fn returning_patient_books_half_hour_without_a_duplicate_record() {
    let clinic = clinic_with(vec![slot(
        "D2",
        "Dr. Arvind Nair",
        "2024-01-08 11:00",
        "2024-01-08 11:30",
    )])
    .await;

    let existing = clinic
        .patients
        .register("Asha", "Verma", dob("1990-01-01"), "asha@example.com")
        .await
        .unwrap();

    let request = BookingRequest {
        doctor: DoctorPreference::Any,
        duration_minutes: 30,
    };
    let candidate = clinic
        .allocator
        .find_candidates(&request)
        .await
        .unwrap()
        .remove(0);

    let confirmation = clinic.booking.book(book_request(candidate)).await.unwrap();

    assert_eq!(confirmation.appointment.patient_type.as_str(), "returning");
    assert_eq!(confirmation.appointment.patient_id, existing.patient_id);
    assert_eq!(clinic.patients.all_patients().await.len(), 1);
}

#[tokio::test]
async fn candidate_length_must_match_the_duration_policy() {
    let clinic = clinic_with(vec![
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:00", "2024-01-08 09:30"),
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:30", "2024-01-08 10:00"),
    ])
    .await;

    // A new patient picking a 30-minute candidate is rejected before the
    // catalog is touched.
    let request = BookingRequest {
        doctor: DoctorPreference::Any,
        duration_minutes: 30,
    };
    let candidate = clinic
        .allocator
        .find_candidates(&request)
        .await
        .unwrap()
        .remove(0);

    let err = clinic.booking.book(book_request(candidate)).await.unwrap_err();
    assert_matches!(err, BookingError::DurationMismatch { expected: 60, got: 30 });

    assert!(clinic.catalog.snapshot().await.iter().all(|s| s.available));
}

#[tokio::test]
async fn losing_the_race_surfaces_slot_unavailable() {
    let clinic = clinic_with(vec![
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:00", "2024-01-08 09:30"),
        slot("D1", "Dr. Maya Rao", "2024-01-08 09:30", "2024-01-08 10:00"),
    ])
    .await;

    let request = BookingRequest {
        doctor: DoctorPreference::Any,
        duration_minutes: 60,
    };
    let candidate = clinic
        .allocator
        .find_candidates(&request)
        .await
        .unwrap()
        .remove(0);

    // Someone else takes the slot between enumeration and booking.
    clinic.allocator.commit(&candidate).await.unwrap();

    let err = clinic.booking.book(book_request(candidate)).await.unwrap_err();
    assert_matches!(
        err,
        BookingError::Scheduling(SchedulingError::SlotUnavailable)
    );

    // Nothing else happened: no appointment, no patient, no reminders.
    assert!(clinic.booking.all_appointments().await.is_empty());
    assert!(clinic.reminders.all_reminders().await.is_empty());
}

#[tokio::test]
async fn admin_report_exports_the_appointment_table() {
    let clinic = clinic_with(vec![slot(
        "D1",
        "Dr. Maya Rao",
        "2024-01-08 09:00",
        "2024-01-08 09:30",
    )])
    .await;

    clinic
        .patients
        .register("Asha", "Verma", dob("1990-01-01"), "asha@example.com")
        .await
        .unwrap();
    let candidate = clinic
        .allocator
        .find_candidates(&BookingRequest {
            doctor: DoctorPreference::Any,
            duration_minutes: 30,
        })
        .await
        .unwrap()
        .remove(0);
    clinic.booking.book(book_request(candidate)).await.unwrap();

    let path = clinic.booking.export_admin_report().await.unwrap();
    assert!(path.exists());

    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("appointment_id"));
    assert!(content.contains("Asha Verma"));
}

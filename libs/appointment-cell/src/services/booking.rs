use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use notification_cell::services::{OutboxMailer, ReminderScheduler};
use patient_cell::models::Patient;
use patient_cell::services::PatientDirectory;
use scheduling_cell::services::{duration_for_patient_type, SlotAllocator};
use shared_config::AppConfig;
use shared_store::{CsvTable, StoreError};

use crate::models::{
    AppointmentRecord, AppointmentStatus, BookAppointmentRequest, BookingConfirmation,
    BookingError,
};
use crate::services::calendar::create_ics_for_appointment;

const FALLBACK_EMAIL: &str = "new.patient@example.com";

/// Orchestrates the whole booking flow: duration policy, slot commit,
/// appointment record, patient registration, confirmation messages, calendar
/// file and reminder plan.
pub struct BookingService {
    allocator: Arc<SlotAllocator>,
    patients: Arc<PatientDirectory>,
    reminders: Arc<ReminderScheduler>,
    mailer: Arc<OutboxMailer>,
    appointments: CsvTable<AppointmentRecord>,
    exports_dir: PathBuf,
}

impl BookingService {
    pub fn new(
        config: &AppConfig,
        allocator: Arc<SlotAllocator>,
        patients: Arc<PatientDirectory>,
        reminders: Arc<ReminderScheduler>,
        mailer: Arc<OutboxMailer>,
    ) -> Result<Self, BookingError> {
        let appointments = CsvTable::open(config.appointments_path())?;
        Ok(Self {
            allocator,
            patients,
            reminders,
            mailer,
            appointments,
            exports_dir: config.exports_dir.clone(),
        })
    }

    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        info!(
            "Booking appointment for {} {} with doctor {}",
            request.first_name, request.last_name, request.candidate.doctor_id
        );

        // Step 1: Patient lookup and duration policy
        let matched = self
            .patients
            .match_patient(&request.first_name, &request.last_name, request.dob)
            .await;
        let expected = duration_for_patient_type(matched.patient_type.as_str());
        if request.candidate.duration_minutes != expected {
            return Err(BookingError::DurationMismatch {
                expected,
                got: request.candidate.duration_minutes,
            });
        }

        // Step 2: Commit the slot (availability re-checked under the
        // catalog's critical section; a lost race surfaces as SlotUnavailable)
        let booked = self.allocator.commit(&request.candidate).await?;

        // Step 3: Register first-time patients
        let patient = match matched.patient {
            Some(patient) => patient,
            None => {
                let email = request.email.as_deref().unwrap_or(FALLBACK_EMAIL);
                self.patients
                    .register(&request.first_name, &request.last_name, request.dob, email)
                    .await?
            }
        };

        // Step 4: Confirmation and intake-form emails. Delivery problems are
        // logged and reflected in the record's sent flags; the booking stands.
        let context = email_context(&patient, &booked.doctor_name, &booked.slot_start, &request);
        let confirmation_sent = self
            .send_logged(&patient.email, "email_confirm.txt", &context)
            .await;
        let intake_form_sent = self
            .send_logged(&patient.email, "email_intake_form.txt", &context)
            .await;

        // Step 5: Calendar file
        let calendar_file = match create_ics_for_appointment(
            &self.exports_dir,
            &booked.id.to_string(),
            &booked.doctor_name,
            booked.slot_start,
            booked.duration_minutes,
            &request.clinic_location,
        ) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write calendar file: {}", e);
                None
            }
        };

        // Step 6: Persist the appointment record
        let record = AppointmentRecord {
            appointment_id: booked.id.to_string(),
            patient_id: patient.patient_id.clone(),
            patient_name: patient.full_name(),
            dob: patient.dob,
            patient_type: matched.patient_type,
            doctor_id: booked.doctor_id.clone(),
            doctor_name: booked.doctor_name.clone(),
            slot_start: booked.slot_start,
            slot_end: booked.slot_end,
            clinic_location: request.clinic_location.clone(),
            insurance_carrier: request.insurance_carrier.clone(),
            member_id: request.member_id.clone(),
            group_number: request.group_number.clone(),
            intake_form_sent,
            confirmation_sent,
            status: AppointmentStatus::Booked,
        };
        self.appointments.append(vec![record.clone()]).await?;

        // Step 7: Reminder plan
        let plan = self
            .reminders
            .schedule_for_appointment(&record.appointment_id, booked.slot_start)
            .await?;

        info!(
            "Appointment {} confirmed for patient {}",
            record.appointment_id, record.patient_id
        );
        Ok(BookingConfirmation {
            appointment: record,
            calendar_file,
            reminders_scheduled: plan.len(),
        })
    }

    /// Dump the appointment table to a timestamped CSV in the exports
    /// directory (the admin report).
    pub async fn export_admin_report(&self) -> Result<PathBuf, BookingError> {
        let rows = self.appointments.snapshot().await;

        std::fs::create_dir_all(&self.exports_dir).map_err(StoreError::from)?;
        let path = self.exports_dir.join(format!(
            "admin_report_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        let mut writer = csv::Writer::from_path(&path).map_err(StoreError::from)?;
        for row in &rows {
            writer.serialize(row).map_err(StoreError::from)?;
        }
        writer.flush().map_err(StoreError::from)?;

        info!("Exported admin report with {} appointments to {}", rows.len(), path.display());
        Ok(path)
    }

    pub async fn all_appointments(&self) -> Vec<AppointmentRecord> {
        self.appointments.snapshot().await
    }

    async fn send_logged(
        &self,
        to_email: &str,
        template: &str,
        context: &HashMap<String, String>,
    ) -> bool {
        match self.mailer.send_template(to_email, template, context, true).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to send {} to {}: {}", template, to_email, e);
                false
            }
        }
    }
}

fn email_context(
    patient: &Patient,
    doctor_name: &str,
    slot_start: &chrono::NaiveDateTime,
    request: &BookAppointmentRequest,
) -> HashMap<String, String> {
    HashMap::from([
        ("first_name".to_string(), patient.first_name.clone()),
        ("doctor_name".to_string(), doctor_name.to_string()),
        (
            "slot_date".to_string(),
            slot_start.format("%b %d, %Y").to_string(),
        ),
        (
            "slot_time".to_string(),
            slot_start.format("%I:%M %p").to_string(),
        ),
        (
            "clinic_location".to_string(),
            request.clinic_location.clone(),
        ),
    ])
}

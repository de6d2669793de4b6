use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use patient_cell::models::{PatientError, PatientType};
use scheduling_cell::models::{SchedulingError, SlotCandidate};
use notification_cell::models::NotificationError;
use shared_models::error::AppError;
use shared_models::timestamp::slot_minutes;
use shared_store::StoreError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// One row of `appointments.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRecord {
    pub appointment_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub dob: NaiveDate,
    pub patient_type: PatientType,
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(with = "slot_minutes")]
    pub slot_start: NaiveDateTime,
    #[serde(with = "slot_minutes")]
    pub slot_end: NaiveDateTime,
    pub clinic_location: String,
    pub insurance_carrier: String,
    pub member_id: String,
    pub group_number: String,
    pub intake_form_sent: bool,
    pub confirmation_sent: bool,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    Booked,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "Booked"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub email: Option<String>,
    pub clinic_location: String,
    pub insurance_carrier: String,
    pub member_id: String,
    pub group_number: String,
    /// The option the patient picked from the candidate listing.
    pub candidate: SlotCandidate,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment: AppointmentRecord,
    pub calendar_file: Option<PathBuf>,
    pub reminders_scheduled: usize,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The chosen candidate's length does not match the duration policy for
    /// this patient type.
    #[error("Candidate duration {got} does not match the {expected}-minute policy for this patient")]
    DurationMismatch { expected: i64, got: i64 },

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::DurationMismatch { .. } => AppError::ValidationError(err.to_string()),
            BookingError::Scheduling(e) => e.into(),
            BookingError::Patient(e) => e.into(),
            BookingError::Notification(e) => e.into(),
            BookingError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

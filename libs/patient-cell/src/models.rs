use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::error::AppError;
use shared_store::StoreError;

/// One row of `patients.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub email: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Whether the patient has a record on file. Drives the consultation length
/// (new patients get the longer intake visit).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    New,
    Returning,
}

impl PatientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientType::New => "new",
            PatientType::Returning => "returning",
        }
    }
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchPatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
}

/// Result of the greeting lookup: either the record on file, or a new
/// patient whose record will be created after booking.
#[derive(Debug, Clone, Serialize)]
pub struct PatientMatch {
    pub patient_type: PatientType,
    pub patient: Option<Patient>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

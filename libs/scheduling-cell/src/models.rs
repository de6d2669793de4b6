use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::timestamp::slot_minutes;
use shared_store::StoreError;

/// Slot granularity of the whole schedule, in minutes.
pub const SLOT_MINUTES: i64 = 30;

// ==============================================================================
// CATALOG MODELS
// ==============================================================================

/// One bookable half-hour for one doctor, as stored in `doctor_schedule.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(with = "slot_minutes")]
    pub slot_start: NaiveDateTime,
    #[serde(with = "slot_minutes")]
    pub slot_end: NaiveDateTime,
    pub available: bool,
}

impl Slot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            doctor_id: self.doctor_id.clone(),
            slot_start: self.slot_start,
        }
    }
}

/// Slot identity: `(doctor_id, slot_start)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub doctor_id: String,
    pub slot_start: NaiveDateTime,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DoctorPreference {
    #[default]
    Any,
    Doctor(String),
}

impl DoctorPreference {
    pub fn matches(&self, doctor_id: &str) -> bool {
        match self {
            DoctorPreference::Any => true,
            DoctorPreference::Doctor(id) => id == doctor_id,
        }
    }
}

/// Ephemeral query for bookable options, built per call.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor: DoctorPreference,
    pub duration_minutes: i64,
}

/// A slot, or a contiguous pair of slots, offered for selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotCandidate {
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(with = "slot_minutes")]
    pub slot_start: NaiveDateTime,
    #[serde(with = "slot_minutes")]
    pub slot_end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl SlotCandidate {
    /// Identities of the catalog slots this candidate spans. Both halves of an
    /// hour candidate are matched by their own start timestamp.
    pub fn underlying_keys(&self) -> Vec<SlotKey> {
        let mut keys = vec![SlotKey {
            doctor_id: self.doctor_id.clone(),
            slot_start: self.slot_start,
        }];
        if self.duration_minutes == 60 {
            keys.push(SlotKey {
                doctor_id: self.doctor_id.clone(),
                slot_start: self.slot_start + Duration::minutes(SLOT_MINUTES),
            });
        }
        keys
    }
}

/// Confirmed reservation produced by a successful commit. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub id: Uuid,
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(with = "slot_minutes")]
    pub slot_start: NaiveDateTime,
    #[serde(with = "slot_minutes")]
    pub slot_end: NaiveDateTime,
    pub duration_minutes: i64,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// The race between enumeration and commit was lost; re-query candidates.
    #[error("Requested slot is no longer available")]
    SlotUnavailable,

    #[error("Unsupported appointment duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::SlotUnavailable => AppError::Conflict(err.to_string()),
            SchedulingError::InvalidDuration(_) => AppError::BadRequest(err.to_string()),
            SchedulingError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

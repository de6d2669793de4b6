use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::timestamp::{slot_minutes, slot_minutes_opt};
use shared_store::StoreError;

/// Reminder cadence: hours before the appointment start, in firing order.
/// Sequence numbers 1..=3 are assigned in this same order.
pub const REMINDER_OFFSET_HOURS: [i64; 3] = [72, 24, 2];

/// One row of `reminders.csv`. The three `response_*` columns are reserved
/// for patient replies collected by a future channel and are written empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub appointment_id: String,
    pub reminder_number: i64,
    #[serde(with = "slot_minutes")]
    pub scheduled_for: NaiveDateTime,
    #[serde(with = "slot_minutes_opt")]
    pub sent_at: Option<NaiveDateTime>,
    pub channel: String,
    pub response_forms_filled: String,
    pub response_confirmed: String,
    pub response_cancel_reason: String,
}

impl Reminder {
    pub fn is_fired(&self) -> bool {
        self.sent_at.is_some()
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.is_fired() && self.scheduled_for <= now
    }
}

/// The fixed pre-appointment plan: one unfired entry per offset, sequence
/// numbers assigned in declaration order. Total, cannot fail.
pub fn build_plan(appointment_id: &str, start: NaiveDateTime) -> Vec<Reminder> {
    REMINDER_OFFSET_HOURS
        .iter()
        .enumerate()
        .map(|(i, hours)| Reminder {
            appointment_id: appointment_id.to_string(),
            reminder_number: (i + 1) as i64,
            scheduled_for: start - Duration::hours(*hours),
            sent_at: None,
            channel: "email".to_string(),
            response_forms_filled: String::new(),
            response_confirmed: String::new(),
            response_cancel_reason: String::new(),
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

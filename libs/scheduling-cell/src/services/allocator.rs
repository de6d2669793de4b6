use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{BookedAppointment, BookingRequest, SchedulingError, Slot, SlotCandidate};
use crate::services::catalog::SlotCatalog;

/// Consultation length by patient type: new patients get a full hour, everyone
/// else (returning or unrecognized) a half hour. Total, no error case.
pub fn duration_for_patient_type(patient_type: &str) -> i64 {
    if patient_type == "new" {
        60
    } else {
        30
    }
}

/// Derives patient-facing booking options from the catalog and commits the
/// chosen one. Never caches availability: every query re-reads catalog state.
pub struct SlotAllocator {
    catalog: Arc<SlotCatalog>,
}

impl SlotAllocator {
    pub fn new(catalog: Arc<SlotCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<SlotCatalog> {
        &self.catalog
    }

    /// Enumerate bookable options for the request, in catalog order.
    ///
    /// An empty vector means "no availability" and is a valid outcome, not an
    /// error. A duration outside {30, 60} is rejected before the catalog is
    /// read.
    pub async fn find_candidates(
        &self,
        request: &BookingRequest,
    ) -> Result<Vec<SlotCandidate>, SchedulingError> {
        validate_duration(request.duration_minutes)?;

        let snapshot = self.catalog.snapshot().await;
        let open: Vec<Slot> = snapshot
            .into_iter()
            .filter(|slot| request.doctor.matches(&slot.doctor_id))
            .filter(|slot| slot.available)
            .collect();

        let candidates = if request.duration_minutes == 30 {
            open.iter().map(half_hour_candidate).collect()
        } else {
            hour_candidates(&open)
        };

        debug!(
            "Found {} candidate(s) for duration {}",
            candidates.len(),
            request.duration_minutes
        );
        Ok(candidates)
    }

    /// Reserve the candidate's underlying slot(s) and confirm the booking.
    ///
    /// Availability is re-checked inside the catalog's critical section, so a
    /// candidate that was taken since enumeration fails with `SlotUnavailable`
    /// and the caller must re-query.
    pub async fn commit(
        &self,
        candidate: &SlotCandidate,
    ) -> Result<BookedAppointment, SchedulingError> {
        validate_duration(candidate.duration_minutes)?;

        self.catalog.reserve(&candidate.underlying_keys()).await?;

        let appointment = BookedAppointment {
            id: Uuid::new_v4(),
            doctor_id: candidate.doctor_id.clone(),
            doctor_name: candidate.doctor_name.clone(),
            slot_start: candidate.slot_start,
            slot_end: candidate.slot_start + Duration::minutes(candidate.duration_minutes),
            duration_minutes: candidate.duration_minutes,
        };
        info!(
            "Committed {}-minute appointment {} with doctor {}",
            appointment.duration_minutes, appointment.id, appointment.doctor_id
        );
        Ok(appointment)
    }
}

fn validate_duration(duration_minutes: i64) -> Result<(), SchedulingError> {
    match duration_minutes {
        30 | 60 => Ok(()),
        other => Err(SchedulingError::InvalidDuration(other)),
    }
}

fn half_hour_candidate(slot: &Slot) -> SlotCandidate {
    SlotCandidate {
        doctor_id: slot.doctor_id.clone(),
        doctor_name: slot.doctor_name.clone(),
        slot_start: slot.slot_start,
        slot_end: slot.slot_end,
        duration_minutes: 30,
    }
}

/// Adjacent-pair scan per doctor: every pair of strictly contiguous slots
/// belonging to the same doctor forms an hour candidate, even when another
/// doctor's rows sit between the two halves in catalog order. Overlapping
/// windows are kept on purpose (09:00-10:00 and 09:30-10:30 can both appear);
/// commit re-validates availability, so at most one of them can win a shared
/// slot.
fn hour_candidates(open: &[Slot]) -> Vec<SlotCandidate> {
    // Partition by doctor, keeping catalog row order within each group.
    let mut by_doctor: Vec<(&str, Vec<&Slot>)> = Vec::new();
    for slot in open {
        match by_doctor.iter().position(|(id, _)| *id == slot.doctor_id) {
            Some(i) => by_doctor[i].1.push(slot),
            None => by_doctor.push((slot.doctor_id.as_str(), vec![slot])),
        }
    }

    by_doctor
        .into_iter()
        .flat_map(|(_, slots)| {
            slots
                .windows(2)
                .filter(|pair| pair[0].slot_end == pair[1].slot_start)
                .map(|pair| SlotCandidate {
                    doctor_id: pair[0].doctor_id.clone(),
                    doctor_name: pair[0].doctor_name.clone(),
                    slot_start: pair[0].slot_start,
                    slot_end: pair[1].slot_end,
                    duration_minutes: 60,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::info;

use crate::models::{SchedulingError, Slot, SLOT_MINUTES};
use crate::services::catalog::SlotCatalog;

/// Shape of a regenerated schedule: which doctors, how many days, and the
/// daily slot grid.
#[derive(Debug, Clone)]
pub struct ScheduleTemplate {
    pub doctors: Vec<(String, String)>,
    pub days: u32,
    pub day_start: NaiveTime,
    pub slots_per_day: u32,
}

impl Default for ScheduleTemplate {
    fn default() -> Self {
        Self {
            doctors: vec![
                ("D1".to_string(), "Dr. Maya Rao".to_string()),
                ("D2".to_string(), "Dr. Arvind Nair".to_string()),
                ("D3".to_string(), "Dr. Leena Kapoor".to_string()),
            ],
            days: 7,
            // 16 half-hour slots covering 09:00 to 17:00
            day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid clock time"),
            slots_per_day: 16,
        }
    }
}

impl ScheduleTemplate {
    /// Materialize the full slot grid starting from `first_day`, grouped by
    /// doctor then day then start time. All slots begin available.
    pub fn build_slots(&self, first_day: NaiveDate) -> Vec<Slot> {
        let mut slots = Vec::new();
        for (doctor_id, doctor_name) in &self.doctors {
            for day in 0..self.days {
                let day_start = (first_day + Duration::days(day as i64)).and_time(self.day_start);
                for i in 0..self.slots_per_day {
                    let slot_start = day_start + Duration::minutes(i as i64 * SLOT_MINUTES);
                    slots.push(Slot {
                        doctor_id: doctor_id.clone(),
                        doctor_name: doctor_name.clone(),
                        slot_start,
                        slot_end: slot_start + Duration::minutes(SLOT_MINUTES),
                        available: true,
                    });
                }
            }
        }
        slots
    }
}

/// Bulk slot creation. Runs outside the booking path: it replaces the whole
/// catalog rather than mutating individual slots.
pub struct ScheduleGenerator {
    catalog: Arc<SlotCatalog>,
    template: ScheduleTemplate,
}

impl ScheduleGenerator {
    pub fn new(catalog: Arc<SlotCatalog>, template: ScheduleTemplate) -> Self {
        Self { catalog, template }
    }

    pub async fn regenerate(&self, first_day: NaiveDate) -> Result<usize, SchedulingError> {
        let slots = self.template.build_slots(first_day);
        let count = self.catalog.replace_all(slots).await?;
        info!(
            "Regenerated schedule: {} slots across {} days for {} doctors",
            count,
            self.template.days,
            self.template.doctors.len()
        );
        Ok(count)
    }
}

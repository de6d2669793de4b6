use std::path::Path;

use tracing::{debug, info};

use shared_store::CsvTable;

use crate::models::{SchedulingError, Slot, SlotKey};

/// The authoritative set of bookable slots, backed by `doctor_schedule.csv`.
///
/// Loaded once at startup; every mutation flushes the whole table in a single
/// write. Availability is only ever flipped to `false` by [`SlotCatalog::reserve`];
/// slots are never deleted, only replaced wholesale by schedule regeneration.
pub struct SlotCatalog {
    table: CsvTable<Slot>,
}

impl SlotCatalog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchedulingError> {
        let table = CsvTable::open(path.as_ref().to_path_buf())?;
        Ok(Self { table })
    }

    /// One consistent snapshot of all slots, in catalog row order.
    pub async fn snapshot(&self) -> Vec<Slot> {
        self.table.snapshot().await
    }

    /// Mark every slot in `keys` unavailable, as one critical section.
    ///
    /// All keys are re-checked against current state before any of them is
    /// mutated; if any slot is missing or already taken the whole reserve
    /// fails with `SlotUnavailable` and neither memory nor the CSV changes.
    /// This is what makes two racing commits on the same candidate resolve to
    /// exactly one winner, and what prevents an orphaned half-blocked hour.
    pub async fn reserve(&self, keys: &[SlotKey]) -> Result<(), SchedulingError> {
        debug!("Reserving {} slot(s)", keys.len());
        self.table
            .update(|rows| {
                let mut indices = Vec::with_capacity(keys.len());
                for key in keys {
                    let idx = rows
                        .iter()
                        .position(|slot| {
                            slot.doctor_id == key.doctor_id && slot.slot_start == key.slot_start
                        })
                        .ok_or(SchedulingError::SlotUnavailable)?;
                    if !rows[idx].available {
                        return Err(SchedulingError::SlotUnavailable);
                    }
                    indices.push(idx);
                }
                for idx in indices {
                    rows[idx].available = false;
                }
                Ok(())
            })
            .await
    }

    /// Replace the whole catalog (schedule regeneration).
    pub async fn replace_all(&self, slots: Vec<Slot>) -> Result<usize, SchedulingError> {
        let count = slots.len();
        self.table.replace_all(slots).await?;
        info!("Catalog replaced with {} slots", count);
        Ok(count)
    }
}

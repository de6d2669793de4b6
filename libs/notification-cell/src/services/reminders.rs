use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use shared_store::CsvTable;

use crate::models::{build_plan, NotificationError, Reminder};
use crate::services::outbox::Mailer;

/// Owns the reminder table (`reminders.csv`) and the due sweep.
///
/// Plans are created once per appointment at booking time; the sweep mutates
/// each entry exactly once, unfired -> fired. Delivery happens before the
/// `sent_at` stamp is persisted, so a crash between the two retries the entry
/// on the next sweep: at-least-once, never double-fired after a stamp lands.
pub struct ReminderScheduler {
    table: CsvTable<Reminder>,
    mailer: Arc<dyn Mailer>,
}

impl ReminderScheduler {
    pub fn open(path: impl AsRef<Path>, mailer: Arc<dyn Mailer>) -> Result<Self, NotificationError> {
        let table = CsvTable::open(path.as_ref().to_path_buf())?;
        Ok(Self { table, mailer })
    }

    /// Materialize and persist the reminder plan for a booked appointment.
    pub async fn schedule_for_appointment(
        &self,
        appointment_id: &str,
        appointment_start: NaiveDateTime,
    ) -> Result<Vec<Reminder>, NotificationError> {
        let plan = build_plan(appointment_id, appointment_start);
        self.table.append(plan.clone()).await?;
        info!(
            "Scheduled {} reminders for appointment {}",
            plan.len(),
            appointment_id
        );
        Ok(plan)
    }

    pub async fn all_reminders(&self) -> Vec<Reminder> {
        self.table.snapshot().await
    }

    /// Fire every reminder whose scheduled time has passed; returns how many
    /// were sent.
    ///
    /// A failed delivery is logged and skipped, leaving its entry unstamped
    /// for the next sweep; one bad entry never aborts the batch. Plan rows
    /// are appended in sequence order, so reminders due at the same instant
    /// fire in ascending sequence number.
    pub async fn run_due(&self, now: NaiveDateTime) -> Result<usize, NotificationError> {
        let rows = self.table.snapshot().await;
        let mut delivered: Vec<(String, i64)> = Vec::new();

        for reminder in rows.iter().filter(|r| r.is_due(now)) {
            let content = format!(
                "Subject: Reminder #{} for appointment {}\n\nThis is an automated reminder.",
                reminder.reminder_number, reminder.appointment_id
            );
            match self.mailer.deliver("patient@example.com", &content, &[]).await {
                Ok(_) => delivered.push((reminder.appointment_id.clone(), reminder.reminder_number)),
                Err(e) => warn!(
                    "Failed to deliver reminder #{} for appointment {}: {} (will retry next sweep)",
                    reminder.reminder_number, reminder.appointment_id, e
                ),
            }
        }

        if delivered.is_empty() {
            debug!("No reminders due at {}", now);
            return Ok(0);
        }

        let stamped = self
            .table
            .update(|rows| {
                let mut stamped = 0;
                for row in rows.iter_mut() {
                    let was_delivered = delivered
                        .iter()
                        .any(|(id, n)| *id == row.appointment_id && *n == row.reminder_number);
                    if was_delivered && row.sent_at.is_none() {
                        row.sent_at = Some(now);
                        stamped += 1;
                    }
                }
                Ok::<_, NotificationError>(stamped)
            })
            .await?;

        info!("Fired {} due reminder(s)", stamped);
        Ok(stamped)
    }
}

pub mod outbox;
pub mod reminders;

pub use outbox::{Mailer, OutboxMailer};
pub use reminders::ReminderScheduler;

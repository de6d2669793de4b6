use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers::run_due_reminders;
use crate::services::ReminderScheduler;

pub fn notification_routes(scheduler: Arc<ReminderScheduler>) -> Router {
    Router::new()
        .route("/run-due", post(run_due_reminders))
        .with_state(scheduler)
}

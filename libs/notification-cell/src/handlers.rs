use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Local;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::services::ReminderScheduler;

#[axum::debug_handler]
pub async fn run_due_reminders(
    State(scheduler): State<Arc<ReminderScheduler>>,
) -> Result<Json<Value>, AppError> {
    let now = Local::now().naive_local();
    let sent = scheduler.run_due(now).await?;

    Ok(Json(json!({
        "sent": sent
    })))
}

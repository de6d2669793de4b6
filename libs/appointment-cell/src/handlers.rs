use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::BookAppointmentRequest;
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<BookingService>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let confirmation = service.book(request).await?;

    Ok(Json(json!(confirmation)))
}

#[axum::debug_handler]
pub async fn export_admin_report(
    State(service): State<Arc<BookingService>>,
) -> Result<Json<Value>, AppError> {
    let path = service.export_admin_report().await?;

    Ok(Json(json!({
        "export_path": path
    })))
}

use std::sync::Arc;

use axum::{extract::{Query, State}, Json};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{BookingRequest, DoctorPreference};
use crate::router::SchedulingState;

#[derive(Debug, Clone, Deserialize)]
pub struct SlotSearchQuery {
    pub doctor_id: Option<String>,
    pub duration_minutes: i64,
}

#[axum::debug_handler]
pub async fn search_slots(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<SlotSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let request = BookingRequest {
        doctor: query
            .doctor_id
            .map(DoctorPreference::Doctor)
            .unwrap_or(DoctorPreference::Any),
        duration_minutes: query.duration_minutes,
    };

    let candidates = state.allocator.find_candidates(&request).await?;
    let total = candidates.len();

    // An empty list is "no availability", not an error.
    Ok(Json(json!({
        "candidates": candidates,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn regenerate_schedule(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Value>, AppError> {
    let first_day = Local::now().date_naive();
    let count = state.generator.regenerate(first_day).await?;

    Ok(Json(json!({
        "slots_created": count,
        "first_day": first_day
    })))
}

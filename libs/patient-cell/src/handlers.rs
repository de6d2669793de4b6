use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use scheduling_cell::services::duration_for_patient_type;
use shared_models::error::AppError;

use crate::models::MatchPatientRequest;
use crate::services::PatientDirectory;

#[axum::debug_handler]
pub async fn match_patient(
    State(directory): State<Arc<PatientDirectory>>,
    Json(request): Json<MatchPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let matched = directory
        .match_patient(&request.first_name, &request.last_name, request.dob)
        .await;

    let duration = duration_for_patient_type(matched.patient_type.as_str());

    Ok(Json(json!({
        "patient_type": matched.patient_type,
        "patient": matched.patient,
        "recommended_duration_minutes": duration
    })))
}

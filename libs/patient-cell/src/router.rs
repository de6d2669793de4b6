use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers::match_patient;
use crate::services::PatientDirectory;

pub fn patient_routes(directory: Arc<PatientDirectory>) -> Router {
    Router::new()
        .route("/match", post(match_patient))
        .with_state(directory)
}

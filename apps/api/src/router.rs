use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;
use notification_cell::router::notification_routes;
use notification_cell::services::ReminderScheduler;
use patient_cell::router::patient_routes;
use patient_cell::services::PatientDirectory;
use scheduling_cell::router::{scheduling_routes, SchedulingState};

pub fn create_router(
    patients: Arc<PatientDirectory>,
    scheduling: Arc<SchedulingState>,
    booking: Arc<BookingService>,
    reminders: Arc<ReminderScheduler>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/patients", patient_routes(patients))
        .nest("/scheduling", scheduling_routes(scheduling))
        .nest("/appointments", appointment_routes(booking))
        .nest("/notifications", notification_routes(reminders))
}

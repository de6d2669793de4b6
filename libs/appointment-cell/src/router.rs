use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{book_appointment, export_admin_report};
use crate::services::BookingService;

pub fn appointment_routes(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/book", post(book_appointment))
        .route("/export", get(export_admin_report))
        .with_state(service)
}

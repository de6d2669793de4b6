use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{regenerate_schedule, search_slots};
use crate::services::{ScheduleGenerator, SlotAllocator};

pub struct SchedulingState {
    pub allocator: Arc<SlotAllocator>,
    pub generator: Arc<ScheduleGenerator>,
}

pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/slots", get(search_slots))
        .route("/regenerate", post(regenerate_schedule))
        .with_state(state)
}

// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::SchedulingState;

pub fn appointment_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/search", get(handlers::search_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::reschedule_appointment))
        .route("/{appointment_id}", delete(handlers::cancel_appointment))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .with_state(state)
}

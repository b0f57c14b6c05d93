use std::sync::Arc;

use axum::{routing::get, Router};

use directory_cell::router::directory_routes;
use directory_cell::services::DirectoryService;
use scheduling_cell::router::appointment_routes;
use scheduling_cell::SchedulingState;

pub fn create_router(scheduling: Arc<SchedulingState>, directory: Arc<DirectoryService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Scheduling API is running!" }))
        .nest("/appointments", appointment_routes(scheduling))
        .nest("/directory", directory_routes(directory))
}

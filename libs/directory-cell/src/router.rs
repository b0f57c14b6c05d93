// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::services::DirectoryService;

pub fn directory_routes(directory: Arc<DirectoryService>) -> Router {
    Router::new()
        .route("/doctors", post(handlers::register_doctor))
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/doctors/{doctor_id}", delete(handlers::remove_doctor))
        .route("/rooms", post(handlers::register_room))
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms/{room_id}", get(handlers::get_room))
        .route("/rooms/{room_id}", delete(handlers::remove_room))
        .with_state(directory)
}

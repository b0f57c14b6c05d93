// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, CreateRoomRequest, DirectoryError};
use crate::services::DirectoryService;

fn map_directory_error(e: DirectoryError) -> AppError {
    match e {
        DirectoryError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        DirectoryError::RoomNotFound => AppError::NotFound("Room not found".to_string()),
        DirectoryError::Validation(msg) => AppError::ValidationError(msg),
    }
}

#[axum::debug_handler]
pub async fn register_doctor(
    State(directory): State<Arc<DirectoryService>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = directory
        .register_doctor(request)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!({ "success": true, "doctor": doctor })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(directory): State<Arc<DirectoryService>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = directory
        .get_doctor(doctor_id)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!({ "doctor": doctor })))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(directory): State<Arc<DirectoryService>>,
) -> Result<Json<Value>, AppError> {
    let doctors = directory.list_doctors().await;
    Ok(Json(json!({ "doctors": doctors, "count": doctors.len() })))
}

#[axum::debug_handler]
pub async fn remove_doctor(
    State(directory): State<Arc<DirectoryService>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    directory
        .remove_doctor(doctor_id)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn register_room(
    State(directory): State<Arc<DirectoryService>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Value>, AppError> {
    let room = directory
        .register_room(request)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!({ "success": true, "room": room })))
}

#[axum::debug_handler]
pub async fn get_room(
    State(directory): State<Arc<DirectoryService>>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let room = directory.get_room(room_id).await.map_err(map_directory_error)?;
    Ok(Json(json!({ "room": room })))
}

#[axum::debug_handler]
pub async fn list_rooms(
    State(directory): State<Arc<DirectoryService>>,
) -> Result<Json<Value>, AppError> {
    let rooms = directory.list_rooms().await;
    Ok(Json(json!({ "rooms": rooms, "count": rooms.len() })))
}

#[axum::debug_handler]
pub async fn remove_room(
    State(directory): State<Arc<DirectoryService>>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    directory
        .remove_room(room_id)
        .await
        .map_err(map_directory_error)?;

    Ok(Json(json!({ "success": true })))
}

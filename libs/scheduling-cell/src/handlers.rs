// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentSearchQuery, BookAppointmentRequest, ConflictCheckResponse,
    RescheduleAppointmentRequest, SchedulingError,
};
use crate::SchedulingState;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AppointmentQueryParams {
    pub doctor_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::Validation(msg) => AppError::ValidationError(msg),
        SchedulingError::Conflict(conflict) => AppError::Conflict(conflict.to_string()),
        SchedulingError::NotFound => AppError::NotFound("Appointment no longer exists".to_string()),
        SchedulingError::Storage(msg) => AppError::Storage(msg),
    }
}

// ==============================================================================
// APPOINTMENT BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    let appointment = booking_service
        .book_appointment(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    let appointment = booking_service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    booking_service
        .cancel_appointment(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    let appointment = booking_service
        .get_appointment(appointment_id)
        .await
        .map_err(map_scheduling_error)?
        .ok_or_else(|| AppError::NotFound("Appointment no longer exists".to_string()))?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<SchedulingState>>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    let query = AppointmentSearchQuery {
        doctor_id: params.doctor_id,
        room_id: params.room_id,
        patient_id: params.patient_id,
        from_date: params.from_date,
        to_date: params.to_date,
        limit: params.limit,
        offset: params.offset,
    };

    let appointments = booking_service
        .search_appointments(query)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "count": appointments.len()
    })))
}

/// Advisory conflict pre-check for calendar UIs. Booking re-runs the check
/// under lock, so a clean answer here is not a reservation.
#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = state.booking_service();

    let conflict = booking_service
        .check_conflicts(
            query.doctor_id,
            query.room_id,
            query.start_time,
            query.end_time,
            query.exclude_appointment_id,
        )
        .await
        .map_err(map_scheduling_error)?;

    let response = ConflictCheckResponse {
        has_conflict: conflict.is_some(),
        conflict,
    };

    Ok(Json(json!({ "conflict_check": response })))
}

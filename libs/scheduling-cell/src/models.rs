// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A booked interval reserving one doctor and one room for `[start_time, end_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub doctor_id: Uuid,
    pub room_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Half-open interval overlap: `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
    /// Back-to-back appointments (one ending exactly when the other starts) do
    /// not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Whether this appointment reserves the same doctor or the same room as
    /// the given pair. The OR is deliberate: a doctor cannot be double-booked
    /// across rooms, and a room cannot be double-booked across doctors.
    pub fn shares_resource(&self, doctor_id: Uuid, room_id: Uuid) -> bool {
        self.doctor_id == doctor_id || self.room_id == room_id
    }
}

/// Fields for a new or rescheduled appointment, before the store assigns
/// identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCandidate {
    pub title: String,
    pub doctor_id: Uuid,
    pub room_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: String,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub title: String,
    pub doctor_id: Uuid,
    pub room_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: Option<String>,
}

/// Reschedules carry the full candidate, matching the create payload: time,
/// resources and descriptive fields may all be reassigned in one call.
pub type RescheduleAppointmentRequest = BookAppointmentRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub doctor_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ==============================================================================
// CONFLICT DETECTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub doctor_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflict: Option<ScheduleConflict>,
}

/// Which reserved dimension blocks a candidate booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockedResource {
    Doctor { doctor_id: Uuid },
    Room { room_id: Uuid },
    DoctorAndRoom { doctor_id: Uuid, room_id: Uuid },
}

impl fmt::Display for BlockedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockedResource::Doctor { doctor_id } => write!(f, "doctor {}", doctor_id),
            BlockedResource::Room { room_id } => write!(f, "room {}", room_id),
            BlockedResource::DoctorAndRoom { doctor_id, room_id } => {
                write!(f, "doctor {} and room {}", doctor_id, room_id)
            }
        }
    }
}

/// Structured rejection for an overlapping booking: the blocking resource and
/// the time range of the appointment already holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub resource: BlockedResource,
    pub appointment_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} already booked from {} to {} (appointment {})",
            self.resource, self.start_time, self.end_time, self.appointment_id
        )
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Schedule conflict: {0}")]
    Conflict(ScheduleConflict),

    #[error("Appointment not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

// ==============================================================================
// VALIDATION MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct AppointmentValidationRules {
    pub min_title_chars: usize,
    pub max_booking_horizon_days: i64,
}

impl Default for AppointmentValidationRules {
    fn default() -> Self {
        Self {
            min_title_chars: 3,
            max_booking_horizon_days: 365,
        }
    }
}

// libs/scheduling-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{BlockedResource, ScheduleConflict, SchedulingError};
use crate::store::IntervalStore;

/// Read-side conflict predicate: does a candidate interval for (doctor, room)
/// overlap anything already booked? Never mutates the store.
pub struct ConflictDetectionService {
    store: Arc<dyn IntervalStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn IntervalStore>) -> Self {
        Self { store }
    }

    /// Check a candidate interval against existing bookings.
    ///
    /// The search matches rows on the same doctor OR the same room; a hit on
    /// either dimension blocks the booking. `exclude_appointment_id` skips the
    /// appointment's own row when re-validating an update.
    pub async fn check_conflicts(
        &self,
        doctor_id: Uuid,
        room_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Option<ScheduleConflict>, SchedulingError> {
        // Degenerate intervals cannot overlap anything; callers validate
        // end > start separately, this just keeps the predicate total.
        if end_time <= start_time {
            return Ok(None);
        }

        debug!(
            "Checking conflicts for doctor {} / room {} from {} to {}",
            doctor_id, room_id, start_time, end_time
        );

        let existing = self
            .store
            .find_overlapping(doctor_id, room_id, start_time, end_time, exclude_appointment_id)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let resource = match (existing.doctor_id == doctor_id, existing.room_id == room_id) {
            (true, true) => BlockedResource::DoctorAndRoom { doctor_id, room_id },
            (true, false) => BlockedResource::Doctor { doctor_id },
            (false, true) => BlockedResource::Room { room_id },
            // Unreachable given the store's row filter, but total.
            (false, false) => {
                return Err(SchedulingError::Storage(format!(
                    "store returned non-matching row {} for overlap query",
                    existing.id
                )))
            }
        };

        warn!(
            "Conflict detected: {} blocks [{}, {}) via appointment {}",
            resource, start_time, end_time, existing.id
        );

        Ok(Some(ScheduleConflict {
            resource,
            appointment_id: existing.id,
            start_time: existing.start_time,
            end_time: existing.end_time,
        }))
    }
}

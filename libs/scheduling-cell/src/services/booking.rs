// libs/scheduling-cell/src/services/booking.rs
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use directory_cell::services::ResourceDirectory;
use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentCandidate, AppointmentSearchQuery, AppointmentValidationRules,
    BookAppointmentRequest, RescheduleAppointmentRequest, ScheduleConflict, SchedulingError,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::consistency::SchedulingConsistencyService;
use crate::store::{IntervalStore, StoreError};

/// Booking orchestrator: every write validates first, then conflict-checks,
/// then persists. The check+write section runs under the consistency
/// service's per-resource locks, so for any two attempts whose intervals
/// would overlap on a shared doctor or room, at most one commits.
pub struct AppointmentBookingService {
    store: Arc<dyn IntervalStore>,
    directory: Arc<dyn ResourceDirectory>,
    conflict_service: ConflictDetectionService,
    consistency: Arc<SchedulingConsistencyService>,
    validation_rules: AppointmentValidationRules,
    default_color: String,
}

impl AppointmentBookingService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn IntervalStore>,
        directory: Arc<dyn ResourceDirectory>,
        consistency: Arc<SchedulingConsistencyService>,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&store));
        let validation_rules = AppointmentValidationRules {
            max_booking_horizon_days: config.max_booking_horizon_days,
            ..AppointmentValidationRules::default()
        };

        Self {
            store,
            directory,
            conflict_service,
            consistency,
            validation_rules,
            default_color: config.default_appointment_color.clone(),
        }
    }

    /// Book a new appointment.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for doctor {} / room {} from {} to {}",
            request.doctor_id, request.room_id, request.start_time, request.end_time
        );

        self.validate_booking_request(&request).await?;
        let candidate = self.to_candidate(request);

        // Hold both resource locks across check + insert.
        let _guard = self
            .consistency
            .lock_resources(candidate.doctor_id, candidate.room_id)
            .await;

        if let Some(conflict) = self
            .conflict_service
            .check_conflicts(
                candidate.doctor_id,
                candidate.room_id,
                candidate.start_time,
                candidate.end_time,
                None,
            )
            .await?
        {
            warn!("Booking rejected: {}", conflict);
            return Err(SchedulingError::Conflict(conflict));
        }

        let appointment = match self.store.insert(candidate.clone()).await {
            Ok(appointment) => appointment,
            Err(e) => return Err(self.classify_commit_error(e, &candidate, None).await),
        };

        info!("Appointment {} booked successfully", appointment.id);
        Ok(appointment)
    }

    /// Reschedule an existing appointment: same checked path as create, with
    /// the appointment's own row excluded from the overlap search so moves
    /// into its previous time range succeed.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment {}", appointment_id);

        self.validate_booking_request(&request).await?;

        if self.get_appointment(appointment_id).await?.is_none() {
            return Err(SchedulingError::NotFound);
        }

        let candidate = self.to_candidate(request);

        let _guard = self
            .consistency
            .lock_resources(candidate.doctor_id, candidate.room_id)
            .await;

        if let Some(conflict) = self
            .conflict_service
            .check_conflicts(
                candidate.doctor_id,
                candidate.room_id,
                candidate.start_time,
                candidate.end_time,
                Some(appointment_id),
            )
            .await?
        {
            warn!("Reschedule of {} rejected: {}", appointment_id, conflict);
            return Err(SchedulingError::Conflict(conflict));
        }

        let appointment = match self.store.update_by_id(appointment_id, candidate.clone()).await {
            Ok(appointment) => appointment,
            Err(StoreError::NotFound) => return Err(SchedulingError::NotFound),
            Err(e) => {
                return Err(self
                    .classify_commit_error(e, &candidate, Some(appointment_id))
                    .await)
            }
        };

        info!("Appointment {} rescheduled successfully", appointment_id);
        Ok(appointment)
    }

    /// Cancel an appointment. Removing an interval can never introduce a
    /// conflict, so no lock and no conflict evaluation.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<(), SchedulingError> {
        debug!("Cancelling appointment {}", appointment_id);

        match self.store.delete_by_id(appointment_id).await {
            Ok(()) => {
                info!("Appointment {} cancelled", appointment_id);
                Ok(())
            }
            Err(StoreError::NotFound) => Err(SchedulingError::NotFound),
            Err(e) => Err(SchedulingError::Storage(e.to_string())),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Appointment>, SchedulingError> {
        self.store
            .get_by_id(appointment_id)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store
            .list(query)
            .await
            .map_err(|e| SchedulingError::Storage(e.to_string()))
    }

    /// Advisory pre-check for clients; the authoritative check still runs
    /// under lock inside book/reschedule.
    pub async fn check_conflicts(
        &self,
        doctor_id: Uuid,
        room_id: Uuid,
        start_time: chrono::DateTime<Utc>,
        end_time: chrono::DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Option<ScheduleConflict>, SchedulingError> {
        self.conflict_service
            .check_conflicts(doctor_id, room_id, start_time, end_time, exclude_appointment_id)
            .await
    }

    // ==========================================================================
    // PRIVATE HELPER METHODS
    // ==========================================================================

    async fn validate_booking_request(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<(), SchedulingError> {
        if request.title.trim().chars().count() < self.validation_rules.min_title_chars {
            return Err(SchedulingError::Validation(format!(
                "Title must have at least {} characters",
                self.validation_rules.min_title_chars
            )));
        }

        if request.end_time <= request.start_time {
            return Err(SchedulingError::Validation(
                "End time must be after start time".to_string(),
            ));
        }

        let horizon =
            Utc::now() + ChronoDuration::days(self.validation_rules.max_booking_horizon_days);
        if request.start_time >= horizon {
            return Err(SchedulingError::Validation(format!(
                "Appointment cannot start more than {} days ahead",
                self.validation_rules.max_booking_horizon_days
            )));
        }

        if !self.directory.doctor_exists(request.doctor_id).await {
            return Err(SchedulingError::Validation(format!(
                "Unknown doctor: {}",
                request.doctor_id
            )));
        }

        if !self.directory.room_exists(request.room_id).await {
            return Err(SchedulingError::Validation(format!(
                "Unknown room: {}",
                request.room_id
            )));
        }

        Ok(())
    }

    fn to_candidate(&self, request: BookAppointmentRequest) -> AppointmentCandidate {
        AppointmentCandidate {
            title: request.title,
            doctor_id: request.doctor_id,
            room_id: request.room_id,
            patient_id: request.patient_id,
            start_time: request.start_time,
            end_time: request.end_time,
            color: request.color.unwrap_or_else(|| self.default_color.clone()),
        }
    }

    /// Classify a commit-time store failure. An overlap-exclusion violation
    /// means another writer won a race the advisory locks did not cover (e.g.
    /// an external writer on a shared SQL store): surface it as the business
    /// conflict it represents, re-querying to name the blocking resource.
    async fn classify_commit_error(
        &self,
        error: StoreError,
        candidate: &AppointmentCandidate,
        exclude: Option<Uuid>,
    ) -> SchedulingError {
        match error {
            StoreError::OverlapConstraint => {
                let recheck = self
                    .conflict_service
                    .check_conflicts(
                        candidate.doctor_id,
                        candidate.room_id,
                        candidate.start_time,
                        candidate.end_time,
                        exclude,
                    )
                    .await;
                match recheck {
                    Ok(Some(conflict)) => SchedulingError::Conflict(conflict),
                    _ => SchedulingError::Storage(
                        "overlap constraint violated but conflicting row not visible".to_string(),
                    ),
                }
            }
            other => SchedulingError::Storage(other.to_string()),
        }
    }
}

// libs/scheduling-cell/src/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentCandidate, AppointmentSearchQuery};

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    /// A storage-level range-exclusion constraint rejected the write. Adapters
    /// backed by an engine that enforces the overlap rule itself report losing
    /// writers through this variant; the orchestrator reclassifies it as a
    /// schedule conflict rather than an infrastructure failure.
    #[error("overlap exclusion constraint violated")]
    OverlapConstraint,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable collection of booked appointment intervals.
///
/// `find_overlapping` restricts candidates to rows matching the doctor OR the
/// room and applies the half-open overlap test. Implementations must offer at
/// least read-committed isolation; the at-most-one-winner guarantee is layered
/// on top by the booking orchestrator's resource locks.
#[async_trait]
pub trait IntervalStore: Send + Sync {
    /// First appointment (earliest start) overlapping `[start, end)` on the
    /// same doctor or the same room, skipping `exclude` if given.
    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Persist a new appointment, assigning its id and timestamps.
    async fn insert(&self, candidate: AppointmentCandidate) -> Result<Appointment, StoreError>;

    /// Replace the mutable fields of an existing appointment in place.
    async fn update_by_id(
        &self,
        id: Uuid,
        candidate: AppointmentCandidate,
    ) -> Result<Appointment, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Filtered listing, ordered by start time descending.
    async fn list(&self, query: AppointmentSearchQuery) -> Result<Vec<Appointment>, StoreError>;
}

/// In-memory interval store. A single RwLock over the row map gives each
/// operation atomicity; cross-operation serialization of check+write is the
/// orchestrator's job.
#[derive(Default)]
pub struct InMemoryIntervalStore {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryIntervalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntervalStore for InMemoryIntervalStore {
    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, StoreError> {
        let rows = self.rows.read().await;
        let mut hit: Option<&Appointment> = None;
        for row in rows.values() {
            if Some(row.id) == exclude {
                continue;
            }
            if !row.shares_resource(doctor_id, room_id) || !row.overlaps(start, end) {
                continue;
            }
            // Earliest-starting match wins, for deterministic reporting.
            if hit.map_or(true, |h| row.start_time < h.start_time) {
                hit = Some(row);
            }
        }
        Ok(hit.cloned())
    }

    async fn insert(&self, candidate: AppointmentCandidate) -> Result<Appointment, StoreError> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            title: candidate.title,
            doctor_id: candidate.doctor_id,
            room_id: candidate.room_id,
            patient_id: candidate.patient_id,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            color: candidate.color,
            created_at: now,
            updated_at: now,
        };

        let mut rows = self.rows.write().await;
        rows.insert(appointment.id, appointment.clone());
        debug!("Inserted appointment {}", appointment.id);
        Ok(appointment)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        candidate: AppointmentCandidate,
    ) -> Result<Appointment, StoreError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        row.title = candidate.title;
        row.doctor_id = candidate.doctor_id;
        row.room_id = candidate.room_id;
        row.patient_id = candidate.patient_id;
        row.start_time = candidate.start_time;
        row.end_time = candidate.end_time;
        row.color = candidate.color;
        row.updated_at = Utc::now();

        debug!("Updated appointment {}", id);
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        match rows.remove(&id) {
            Some(_) => {
                debug!("Deleted appointment {}", id);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).cloned())
    }

    async fn list(&self, query: AppointmentSearchQuery) -> Result<Vec<Appointment>, StoreError> {
        let rows = self.rows.read().await;
        let mut matches: Vec<Appointment> = rows
            .values()
            .filter(|row| {
                query.doctor_id.map_or(true, |d| row.doctor_id == d)
                    && query.room_id.map_or(true, |r| row.room_id == r)
                    && query.patient_id.map_or(true, |p| row.patient_id == p)
                    && query.from_date.map_or(true, |from| row.start_time >= from)
                    && query.to_date.map_or(true, |to| row.start_time <= to)
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matches.into_iter().skip(offset).take(limit).collect())
    }
}

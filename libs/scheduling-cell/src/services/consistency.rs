// libs/scheduling-cell/src/services/consistency.rs
//
// Scheduling consistency service: per-resource advisory locks that close the
// check-then-write window. Two racing bookings touching the same doctor or the
// same room serialize on that resource's lock, so the loser re-checks after the
// winner's commit and observes the conflict.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Guard holding the advisory locks for one booking attempt. Locks release on
/// drop, after the commit or rejection completes.
pub struct ResourceLockGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

pub struct SchedulingConsistencyService {
    // One advisory mutex per resource id (doctor or room). The table only
    // grows with the number of distinct resources ever booked.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SchedulingConsistencyService {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the advisory locks for a (doctor, room) pair.
    ///
    /// Lock order is canonical (sorted by id, duplicates collapsed), so two
    /// attempts contending on overlapping resource sets cannot deadlock.
    pub async fn lock_resources(&self, doctor_id: Uuid, room_id: Uuid) -> ResourceLockGuard {
        let mut ids = vec![doctor_id, room_id];
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let entry = {
                let mut table = self.locks.lock().await;
                Arc::clone(table.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))))
            };
            guards.push(entry.lock_owned().await);
            debug!("Scheduling lock acquired for resource {}", id);
        }

        ResourceLockGuard { _guards: guards }
    }
}

impl Default for SchedulingConsistencyService {
    fn default() -> Self {
        Self::new()
    }
}

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::*;
pub use services::*;
pub use store::{InMemoryIntervalStore, IntervalStore, StoreError};

use std::sync::Arc;

use directory_cell::services::ResourceDirectory;
use shared_config::AppConfig;

/// Shared state for the scheduling cell: the interval store, the resource
/// directory used for existence checks, and the advisory lock table. Handlers
/// build a booking service per request on top of these.
pub struct SchedulingState {
    pub config: AppConfig,
    pub store: Arc<dyn IntervalStore>,
    pub directory: Arc<dyn ResourceDirectory>,
    pub consistency: Arc<SchedulingConsistencyService>,
}

impl SchedulingState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn IntervalStore>,
        directory: Arc<dyn ResourceDirectory>,
    ) -> Self {
        Self {
            config,
            store,
            directory,
            consistency: Arc::new(SchedulingConsistencyService::new()),
        }
    }

    pub fn booking_service(&self) -> AppointmentBookingService {
        AppointmentBookingService::new(
            &self.config,
            Arc::clone(&self.store),
            Arc::clone(&self.directory),
            Arc::clone(&self.consistency),
        )
    }
}

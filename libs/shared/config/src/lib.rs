use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub max_booking_horizon_days: i64,
    pub default_appointment_color: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SERVER_PORT not set or invalid, defaulting to 3000");
                    3000
                }),
            max_booking_horizon_days: env::var("MAX_BOOKING_HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(365),
            default_appointment_color: env::var("DEFAULT_APPOINTMENT_COLOR")
                .unwrap_or_else(|_| "#3b82f6".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_booking_horizon_days: 365,
            default_appointment_color: "#3b82f6".to_string(),
        }
    }
}

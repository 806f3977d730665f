//! Worker configuration loaded from environment variables.

use messaging::memory::DEFAULT_CAPACITY;
use saga_store::DEFAULT_RETENTION_SECS;

/// Worker configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `SAGA_RETENTION_SECS` — instance store retention (default: `600`)
/// - `BUS_CAPACITY` — per-subscriber bus capacity (default: `256`)
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub retention_secs: i64,
    pub bus_capacity: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            retention_secs: std::env::var("SAGA_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETENTION_SECS),
            bus_capacity: std::env::var("BUS_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            retention_secs: DEFAULT_RETENTION_SECS,
            bus_capacity: DEFAULT_CAPACITY,
        }
    }
}

//! # AirSight Telemetry
//!
//! Tracing subscriber setup for the AirSight dashboard.
//!
//! The terminal UI owns stdout, so console output goes to stderr and is off
//! by default. Logs normally land in daily rolling files under the platform
//! data directory.
//!
//! ```no_run
//! use airsight_telemetry::{TelemetryConfig, TelemetrySystem};
//!
//! let _guard = TelemetrySystem::init(TelemetryConfig::default())?;
//! tracing::info!("Application started");
//! # Ok::<(), airsight_telemetry::Error>(())
//! ```

pub mod config;
pub mod system;

pub use config::{LogFormat, LogLevel, TelemetryConfig};
pub use system::{TelemetryGuard, TelemetrySystem};

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Telemetry-specific errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Telemetry system error: {message}")]
    System { message: String },
}

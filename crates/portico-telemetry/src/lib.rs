//! Observability setup for the Portico gateway.
//!
//! Provides structured logging (JSON or pretty) and the standard event
//! names used by every Portico crate.
//!
//! # Usage
//!
//! ```ignore
//! use portico_telemetry::{TelemetryConfig, LogFormat};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//!
//! portico_telemetry::init(&config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, LogWriter, TelemetryConfig};
pub use logging::events;

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Install the global subscriber and emit the startup event.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;
    crate::log_startup!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "portico");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_writer, LogWriter::Stdout);
    }

    #[test]
    fn test_config_builder() {
        let config = TelemetryConfig::new()
            .with_service_name("edge")
            .with_log_level("debug")
            .with_log_format(LogFormat::Pretty)
            .with_log_writer(LogWriter::Stderr);

        assert_eq!(config.service_name, "edge");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_writer, LogWriter::Stderr);
    }
}

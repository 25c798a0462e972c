//! Structured logging with JSON or pretty output.
//!
//! Logs go to stdout as one JSON object per line in production. Commands
//! that print their result on stdout log to stderr instead.

use crate::{LogFormat, LogWriter, TelemetryConfig, TelemetryError};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// Sets up tracing-subscriber with either JSON or pretty format,
/// respecting the configured log level.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // Build the env filter from config or RUST_LOG
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let writer = match config.log_writer {
        LogWriter::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogWriter::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    match config.log_format {
        LogFormat::Json => init_json_logging(filter, writer),
        LogFormat::Pretty => init_pretty_logging(filter, writer),
    }
}

fn init_json_logging(filter: EnvFilter, writer: BoxMakeWriter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter, writer: BoxMakeWriter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// Gateway is starting up.
    pub const STARTUP: &str = "startup";

    /// Gateway is listening on a port.
    pub const LISTENING: &str = "listening";

    /// Gateway is shutting down.
    pub const SHUTDOWN: &str = "shutdown";

    /// An upstream document could not be retrieved.
    pub const SOURCE_FETCH_FAILED: &str = "source_fetch_failed";

    /// An upstream document was retrieved but could not be parsed.
    pub const SOURCE_PARSE_FAILED: &str = "source_parse_failed";

    /// An aggregation pass produced a merged document.
    pub const DOCUMENT_MERGED: &str = "document_merged";

    /// The admission gate rejected a request.
    pub const ADMISSION_REJECTED: &str = "admission_rejected";

    /// The admission gate let a public path through unchecked.
    pub const ADMISSION_BYPASSED: &str = "admission_bypassed";

    /// Forwarding to an upstream failed.
    pub const FORWARD_FAILED: &str = "forward_failed";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
/// Callers must depend on `tracing`.
#[macro_export]
macro_rules! log_startup {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::STARTUP,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_listening {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::LISTENING,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_shutdown {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SHUTDOWN,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_source_fetch_failed {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::SOURCE_FETCH_FAILED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_source_parse_failed {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::SOURCE_PARSE_FAILED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_document_merged {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::DOCUMENT_MERGED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_admission_rejected {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::ADMISSION_REJECTED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_admission_bypassed {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::ADMISSION_BYPASSED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_forward_failed {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::FORWARD_FAILED,
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // Logging can only be initialized once per process, so these tests
    // cover the configuration side only.

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("invalid"), None);
    }

    #[test]
    fn test_event_names_are_distinct() {
        let names = [
            events::STARTUP,
            events::LISTENING,
            events::SHUTDOWN,
            events::SOURCE_FETCH_FAILED,
            events::SOURCE_PARSE_FAILED,
            events::DOCUMENT_MERGED,
            events::ADMISSION_REJECTED,
            events::ADMISSION_BYPASSED,
            events::FORWARD_FAILED,
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}

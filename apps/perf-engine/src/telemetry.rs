//! Logging setup.
//!
//! Installs a `tracing-subscriber` registry writing to stderr so that
//! reports on stdout stay machine-readable.
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `observability.logging.level` when set
//!
//! # Usage
//!
//! ```rust,ignore
//! use perf_engine::config::LoggingConfig;
//! use perf_engine::telemetry::init_logging;
//!
//! init_logging(&LoggingConfig::default())?;
//! ```

use std::io::IsTerminal;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{level}': {message}")]
    FilterError {
        /// Configured level.
        level: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber was already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Span close events (with
/// timings) are emitted when `include_spans` is set.
///
/// # Errors
///
/// Returns an error if the level cannot be parsed or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(config.include_spans)
                    .with_span_list(config.include_spans)
                    .with_span_events(span_events)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_span_events(span_events)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| TelemetryError::SubscriberError(e.to_string()))?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        include_spans = config.include_spans,
        "Logging initialized"
    );
    Ok(())
}

fn level_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level.to_ascii_lowercase()).map_err(|e| TelemetryError::FilterError {
        level: level.to_string(),
        message: e.to_string(),
    })
}

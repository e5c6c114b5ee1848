//! Structured logging setup for kms-jose

use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON lines (for production)
    Json,
    /// Human-readable (for development)
    #[default]
    Console,
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unknown log format: {0} (expected \"json\" or \"console\")")]
    UnknownFormat(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" | "pretty" | "text" => Ok(LogFormat::Console),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Initialize logging for a kms-jose component
///
/// Logs go to stderr. `RUST_LOG` takes precedence over `default_level`.
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging(
    component: &str,
    default_level: &str,
    format: LogFormat,
) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()?,
        LogFormat::Console => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()?,
    }

    tracing::info!(component = component, format = ?format, "Logging initialized");
    Ok(())
}

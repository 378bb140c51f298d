//! Logging setup for applications embedding a room session
//!
//! Sessions log through `tracing` and never install a subscriber themselves.
//! Applications call one of these functions once, early, to decide where the
//! output goes.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "ROOM_LOG_MODE";

/// Environment variable overriding the log level / filter directives
pub const LOG_LEVEL_ENV: &str = "ROOM_LOG_LEVEL";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output, for UIs that own the terminal
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `ROOM_LOG_LEVEL`: filter directives, e.g. `room_session=debug,room_api=info`
/// - `RUST_LOG`: used when `ROOM_LOG_LEVEL` is not set
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Parse a mode name as accepted in `ROOM_LOG_MODE`
pub fn parse_mode(value: &str) -> LoggingMode {
    match value.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => LoggingMode::Development,
        "debug" => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

/// Initialize logging from `ROOM_LOG_MODE`
///
/// Defaults to silent when the variable is missing or unrecognised.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var(LOG_MODE_ENV)
        .map(|v| parse_mode(&v))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

/// `ROOM_LOG_LEVEL`, then `RUST_LOG`, then the mode's default level
fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directives).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

/// Same as `init_logging(LoggingMode::Silent)`
pub fn init_silent() -> Result<(), LoggingError> {
    init_logging(LoggingMode::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
        assert!(init_silent().is_ok());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("development"), LoggingMode::Development);
        assert_eq!(parse_mode(" DEBUG "), LoggingMode::Debug);
        assert_eq!(parse_mode("silent"), LoggingMode::Silent);
        assert_eq!(parse_mode("verbose"), LoggingMode::Silent);
    }
}

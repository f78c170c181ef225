//! Logging and observability
//!
//! Structured logging over `tracing`:
//! - Human-readable console output on stderr
//! - Configurable log levels
//! - Optional JSON file logging with rotation
//!
//! The macros below keep the field names of recurring events consistent
//! across the dump and live processors.
//!
//! # Example
//!
//! ```no_run
//! use scrub::logging::init_logging;
//! use scrub::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a table scrub
///
/// # Example
///
/// ```no_run
/// use scrub::log_table_start;
///
/// log_table_start!("users", "id", 1200);
/// ```
#[macro_export]
macro_rules! log_table_start {
    ($table:expr, $primary_key:expr, $estimated_rows:expr) => {
        tracing::info!(
            table = %$table,
            primary_key = %$primary_key,
            estimated_rows = $estimated_rows,
            "Scrubbing table"
        );
    };
}

/// Log the completion of a table scrub
///
/// # Example
///
/// ```no_run
/// use scrub::log_table_complete;
/// use std::time::Duration;
///
/// log_table_complete!("users", 1200, 1187, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_table_complete {
    ($table:expr, $rows_read:expr, $rows_updated:expr, $duration:expr) => {
        tracing::info!(
            table = %$table,
            rows_read = $rows_read,
            rows_updated = $rows_updated,
            duration_ms = $duration.as_millis(),
            "Table scrubbed"
        );
    };
}

/// Log row progress within a table
///
/// # Example
///
/// ```no_run
/// use scrub::log_row_progress;
///
/// log_row_progress!("users", 10_000, 52_000);
/// ```
#[macro_export]
macro_rules! log_row_progress {
    ($table:expr, $current:expr, $total:expr) => {
        tracing::info!(
            table = %$table,
            current = $current,
            total = $total,
            progress_pct = if $total == 0 {
                100.0
            } else {
                $current as f64 / $total as f64 * 100.0
            },
            "Scrub progress"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use scrub::log_error_with_context;
/// use scrub::domain::ScrubError;
///
/// let error = ScrubError::Connection("reset by peer".to_string());
/// log_error_with_context!(&error, "row id=42");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use scrub::log_retry_attempt;
///
/// log_retry_attempt!(2, 5, "duplicate key on users.email");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

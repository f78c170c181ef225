//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Configuration error |
//! | 4 | Connection error |
//! | 5 | Fatal error |

pub mod dump;
pub mod init;
pub mod live;
pub mod validate;

use crate::domain::ScrubError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed run
pub fn exit_code_for(err: &ScrubError) -> i32 {
    if err.is_configuration() {
        EXIT_CONFIGURATION
    } else if err.is_connection() {
        EXIT_CONNECTION
    } else {
        EXIT_FATAL
    }
}

/// JSON document written by `--report`
#[derive(Debug, Serialize)]
struct RunReport<'a, T: Serialize> {
    command: &'a str,
    generated_at: DateTime<Utc>,
    summary: &'a T,
}

/// Writes `summary` as a pretty-printed JSON report
pub(crate) fn write_report<T: Serialize>(
    path: &Path,
    command: &str,
    summary: &T,
) -> anyhow::Result<()> {
    let report = RunReport {
        command,
        generated_at: Utc::now(),
        summary,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

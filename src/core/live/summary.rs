//! Live run summary and reporting

use serde::Serialize;
use std::time::Duration;

/// Most dry-run statements kept per table
pub const DRY_RUN_SAMPLE_LIMIT: usize = 20;

/// Outcome of scrubbing one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,

    /// Column the updates are keyed on
    pub primary_key: String,

    /// Configured columns the schema enforces as unique, sorted
    pub unique_columns: Vec<String>,

    pub estimated_rows: u64,
    pub rows_read: u64,

    /// Rows written, or that would have been written in a dry run
    pub rows_updated: u64,

    pub rows_unchanged: u64,

    /// Rows skipped because their primary key value was NULL or missing
    pub rows_without_key: u64,

    /// Write attempts repeated after a duplicate-key conflict
    pub collision_retries: u64,

    /// Values written as NULL because no unique candidate was found
    pub exhausted_values: u64,

    /// First few statements of a dry run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dry_run_samples: Vec<String>,

    pub duration_ms: u64,
}

impl TableSummary {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            ..Self::default()
        }
    }

    /// Keeps `statement` if the sample is not yet full
    pub fn record_dry_run(&mut self, statement: &str) {
        if self.dry_run_samples.len() < DRY_RUN_SAMPLE_LIMIT {
            self.dry_run_samples.push(statement.to_string());
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }
}

/// Outcome of a live run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveSummary {
    pub dry_run: bool,
    pub tables: Vec<TableSummary>,
    pub duration_ms: u64,
}

impl LiveSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn rows_read(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_read).sum()
    }

    pub fn rows_updated(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_updated).sum()
    }

    pub fn collision_retries(&self) -> u64 {
        self.tables.iter().map(|t| t.collision_retries).sum()
    }

    pub fn exhausted_values(&self) -> u64 {
        self.tables.iter().map(|t| t.exhausted_values).sum()
    }

    /// Find a table's summary by name
    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            dry_run = self.dry_run,
            tables = self.tables.len(),
            rows_read = self.rows_read(),
            rows_updated = self.rows_updated(),
            collision_retries = self.collision_retries(),
            duration_ms = self.duration_ms,
            "Live scrub finished"
        );

        if self.exhausted_values() > 0 {
            tracing::warn!(
                exhausted_values = self.exhausted_values(),
                "Some values could not be made unique and were written as NULL"
            );
        }
    }
}

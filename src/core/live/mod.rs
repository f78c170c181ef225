//! Live database scrubbing
//!
//! - [`processor`] streams rows and writes updates, retrying duplicate-key conflicts
//! - [`statement`] builds the per-row `UPDATE`
//! - [`summary`] collects per-table counters

pub mod processor;
pub mod statement;
pub mod summary;

pub use processor::{LiveProcessor, LiveSettings, WriteTarget};
pub use summary::{LiveSummary, TableSummary, DRY_RUN_SAMPLE_LIMIT};

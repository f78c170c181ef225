//! Scrubbing engine
//!
//! The pieces shared by the dump and live processors:
//!
//! - [`dependency`] orders a table's columns so dependencies are scrubbed first
//! - [`filter`] is the counting Bloom filter that keeps replacements unique
//! - [`strategy`] holds the per-kind replacement policies and their fallback chain
//! - [`table`] describes configured tables and columns
//! - [`validator`] decides per column whether and how uniqueness is enforced
//! - [`row_scrubber`] ties them together for one row

pub mod dependency;
pub mod filter;
pub mod row_scrubber;
pub mod strategy;
pub mod table;
pub mod validator;

pub use filter::{FilterOptions, UniquenessFilter};
pub use row_scrubber::{RowScrubReport, RowScrubber};
pub use strategy::{FallbackStep, ScrubStrategy};
pub use table::{ColumnOptions, ColumnSpec, ScrubKind, TableSpec};
pub use validator::{AcceptAll, GlobalUniqueness, ScopedUniqueness, Validator, ValidatorFactory};

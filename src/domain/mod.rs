//! Domain types for Scrub.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Error types** ([`ScrubError`])
//! - **Result type alias** ([`Result`])
//! - **Row representation** ([`RowContext`]) shared by the dump and live paths
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ScrubError>`]:
//!
//! ```rust,no_run
//! use scrub::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = scrub::config::load_config("scrub.toml")?;
//!     let _tables = config.table_specs()?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod result;
pub mod row;

// Re-export commonly used types for convenience
pub use errors::ScrubError;
pub use result::Result;
pub use row::RowContext;

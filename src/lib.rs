// Scrub - PII anonymization for SQL dumps and live databases
// Copyright (c) 2025 Scrub Contributors
// Licensed under the MIT License

//! # Scrub - PII anonymization for relational data
//!
//! Scrub replaces personally identifying values with plausible fakes, either
//! by rewriting a textual SQL dump or by updating the rows of a live
//! database in place, without introducing duplicates into columns that must
//! stay unique.
//!
//! ## Architecture
//!
//! Scrub follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Dump and live processors
//! - [`scrub`] - The scrubbing engine: dependency order, uniqueness filter,
//!   strategies and the row scrubber
//! - [`adapters`] - Fake value generation and database integrations
//! - [`domain`] - Errors, result alias and the row type
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrub::adapters::generator::FakerGenerator;
//! use scrub::config::load_config;
//! use scrub::core::dump::DumpProcessor;
//! use std::io::{stdin, stdout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scrub.toml")?;
//!
//! let mut processor = DumpProcessor::new(
//!     config.table_specs()?,
//!     config.uniqueness_filter.clone(),
//!     Box::new(FakerGenerator::from_seed(config.generator.seed)),
//! )?;
//!
//! let summary = processor.process(stdin().lock(), stdout().lock())?;
//! eprintln!("Scrubbed {} rows", summary.rows_scrubbed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Fallback chain
//!
//! Each column value is replaced by the first candidate its validator accepts:
//!
//! 1. a fresh fake value,
//! 2. the original with `_` and four random digits appended,
//! 3. the original with every character but the first and last starred.
//!
//! When all three are rejected the value becomes `NULL` and a warning is
//! logged.
//!
//! ## Error Handling
//!
//! Scrub uses the [`domain::ScrubError`] type for all errors:
//!
//! ```rust,no_run
//! use scrub::domain::ScrubError;
//!
//! fn example() -> Result<(), ScrubError> {
//!     let config = scrub::config::load_config("scrub.toml")?;
//!     let _tables = config.table_specs()?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod scrub;

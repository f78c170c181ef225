//! Core processors for Scrub.
//!
//! Both processors drive the same [`RowScrubber`](crate::scrub::RowScrubber)
//! and differ in where rows come from and how uniqueness is enforced.
//!
//! # Modules
//!
//! - [`dump`] - Rewrites `INSERT` statements of a SQL dump; one uniqueness
//!   filter for the whole run, keyed by raw value
//! - [`live`] - Updates rows of a connected database; one filter per table,
//!   keyed by column, with duplicate-key retries and dry-run
//!
//! # Example
//!
//! ```rust,no_run
//! use scrub::adapters::database;
//! use scrub::adapters::generator::FakerGenerator;
//! use scrub::config::load_config;
//! use scrub::core::live::{LiveProcessor, LiveSettings, WriteTarget};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scrub.toml")?;
//! let reader = database::connect(config.require_database()?).await?;
//!
//! let mut processor = LiveProcessor::new(
//!     config.table_specs()?,
//!     reader,
//!     WriteTarget::DryRun,
//!     LiveSettings::from_config(&config.live, &config.uniqueness_filter),
//!     Box::new(FakerGenerator::from_seed(config.generator.seed)),
//! );
//!
//! let summary = processor.run().await?;
//! println!("Would update {} rows", summary.rows_updated());
//! # Ok(())
//! # }
//! ```

pub mod dump;
pub mod live;

//! External system integrations for Scrub.
//!
//! - [`generator`] - Fake value generation behind the [`generator::FakeValueGenerator`] trait
//! - [`database`] - Database abstraction layer (trait-based) and client factory
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the scrubbing
//! engine and processors can be tested with scripted generators and
//! in-memory databases.
//!
//! ```rust,no_run
//! use scrub::adapters::database;
//! use scrub::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scrub.toml")?;
//! if let Some(db) = &config.database {
//!     let client = database::connect(db).await?;
//!     let pk = client.primary_key("users").await?;
//!     println!("users keyed by {pk}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod generator;
pub mod postgresql;

//! Configuration management for Scrub.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SCRUB_*` environment overrides
//! - Default values for everything but the table declarations
//! - Validation, including column dependency cycles, before any data is touched
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scrub::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scrub.toml")?;
//!
//! for table in config.table_specs()? {
//!     let order: Vec<&str> = table.sorted_columns().map(|c| c.name()).collect();
//!     println!("{}: {}", table.name(), order.join(" -> "));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [uniqueness_filter]
//! size = 1000000
//! hash_count = 5
//!
//! [database]
//! adapter = "postgresql"
//! connection_string = "${SCRUB_DATABASE_URL}"
//!
//! [[tables]]
//! name = "users"
//!
//! [[tables.columns]]
//! name = "fullname"
//! kind = "name"
//!
//! [[tables.columns]]
//! name = "email"
//! kind = "email"
//! depends_on = "fullname"
//! name_column = "fullname"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    AppConfig, ApplicationConfig, ColumnConfig, DatabaseConfig, DependsOn, GeneratorConfig,
    LiveConfig, LoggingConfig, TableConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

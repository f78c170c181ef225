//! Database client factory
//!
//! Creates database clients from configuration.

use crate::adapters::database::traits::DatabaseClient;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::DatabaseConfig;
use crate::domain::{Result, ScrubError};
use std::sync::Arc;

/// Adapter names accepted in `[database] adapter`
pub const SUPPORTED_ADAPTERS: &[&str] = &["postgresql", "postgres"];

/// Connects to the database described by `config`
///
/// Each call opens its own connection, so callers that need distinct read and
/// write connections call it twice.
///
/// # Errors
///
/// Returns a configuration error for unsupported adapters and a connection
/// error if the database cannot be reached.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseClient>> {
    match config.adapter.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => {
            tracing::debug!("Creating PostgreSQL client");
            let client = PostgreSQLClient::connect(config.clone()).await?;
            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn DatabaseClient>)
        }
        other => Err(ScrubError::Configuration(format!(
            "Unsupported database adapter '{}'. Supported: {}",
            other,
            SUPPORTED_ADAPTERS.join(", ")
        ))),
    }
}

//! PostgreSQL database integration
//!
//! [`PostgreSQLClient`] owns the connection and speaks SQL;
//! [`PostgreSQLAdapter`] exposes it through the
//! [`DatabaseClient`](crate::adapters::database::DatabaseClient) trait.

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;

//! Database abstraction traits
//!
//! This module defines what the live processor needs from a relational
//! database. Rows travel as [`RowContext`] text maps so processors never see
//! driver types.

use crate::domain::{Result, RowContext, ScrubError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashSet;

/// Relational database client used by live mode
///
/// Implementations translate driver errors into [`ScrubError`] so that
/// [`DatabaseClient::is_duplicate_key_error`] and
/// [`DatabaseClient::is_connection_error`] can classify them.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Runs a query and returns every row as text
    ///
    /// # Errors
    ///
    /// Returns a database or connection error if the query fails.
    async fn query(&self, sql: &str) -> Result<Vec<RowContext>>;

    /// Runs a statement and returns the number of affected rows
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::DuplicateKey`] for unique constraint violations.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Primary key column of `table`
    async fn primary_key(&self, table: &str) -> Result<String>;

    /// Columns covered by any unique constraint of `table`, primary key included
    async fn unique_columns(&self, table: &str) -> Result<HashSet<String>>;

    /// Streams `SELECT * FROM <table>` without buffering the table
    ///
    /// Rows arrive in whatever order the database yields them.
    fn stream_rows<'a>(&'a self, table: &'a str) -> BoxStream<'a, Result<RowContext>>;

    /// Escapes `value` for use inside a single-quoted literal
    fn escape(&self, value: &str) -> String;

    /// Estimated row count of `table`
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails or returns no number.
    async fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) AS count FROM {}", self.quote_identifier(table));
        let rows = self.query(&sql).await?;
        rows.first()
            .and_then(|row| row.get("count"))
            .and_then(|value| value.as_deref())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| ScrubError::Database(format!("Row count unavailable for table '{table}'")))
    }

    /// Quotes an identifier, treating dots as schema separators
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Renders a value as a SQL literal; `None` is `NULL`
    fn literal(&self, value: Option<&str>) -> String {
        match value {
            Some(value) => format!("'{}'", self.escape(value)),
            None => "NULL".to_string(),
        }
    }

    /// Returns `true` if `err` is a unique constraint violation
    fn is_duplicate_key_error(&self, err: &ScrubError) -> bool {
        err.is_duplicate_key()
    }

    /// Returns `true` if `err` comes from the transport
    fn is_connection_error(&self, err: &ScrubError) -> bool {
        err.is_connection()
    }
}

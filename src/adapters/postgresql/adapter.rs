//! PostgreSQL adapter implementing the database trait

use crate::adapters::database::traits::DatabaseClient;
use crate::adapters::postgresql::client::{escape_literal, quote_identifier, PostgreSQLClient};
use crate::domain::{Result, RowContext};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Primary key assumed when the catalog reports none
pub const FALLBACK_PRIMARY_KEY: &str = "id";

/// PostgreSQL implementation of [`DatabaseClient`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl DatabaseClient for PostgreSQLAdapter {
    async fn query(&self, sql: &str) -> Result<Vec<RowContext>> {
        self.client.query_rows(sql).await
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        self.client.execute(sql).await
    }

    async fn primary_key(&self, table: &str) -> Result<String> {
        let columns = self.client.index_columns(table, "indisprimary").await?;
        if columns.len() > 1 {
            tracing::warn!(
                table = %table,
                columns = ?columns,
                "Composite primary key; keying updates on the first column; an update touching more than one row aborts the run"
            );
        }

        Ok(columns.into_iter().next().unwrap_or_else(|| {
            tracing::warn!(
                table = %table,
                fallback = FALLBACK_PRIMARY_KEY,
                "No primary key found; an update touching more than one row aborts the run"
            );
            FALLBACK_PRIMARY_KEY.to_string()
        }))
    }

    async fn unique_columns(&self, table: &str) -> Result<HashSet<String>> {
        Ok(self
            .client
            .index_columns(table, "indisunique")
            .await?
            .into_iter()
            .collect())
    }

    fn stream_rows<'a>(&'a self, table: &'a str) -> BoxStream<'a, Result<RowContext>> {
        let client = self.client.as_ref();

        stream::try_unfold(false, move |opened| next_batch(client, table, opened))
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    fn escape(&self, value: &str) -> String {
        escape_literal(value)
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier(name)
    }
}

/// One cursor step; the cursor is closed once a fetch comes back empty
async fn next_batch(
    client: &PostgreSQLClient,
    table: &str,
    opened: bool,
) -> Result<Option<(Vec<RowContext>, bool)>> {
    if !opened {
        client.open_cursor(table).await?;
    }

    let batch = client.fetch_cursor().await?;
    if batch.is_empty() {
        client.close_cursor().await?;
        return Ok(None);
    }
    Ok(Some((batch, true)))
}

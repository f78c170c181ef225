//! Live processor
//!
//! Scrubs configured tables of a connected database in place, one row at a
//! time, in whatever order the database streams them. Each changed row gets a
//! single `UPDATE` keyed by its original primary key value.
//!
//! Uniqueness is enforced per table: a filter is allocated only when some
//! configured column is also unique in the schema, and keys are namespaced by
//! column. A write rejected as a duplicate re-runs the whole row, drawing new
//! candidates, up to [`LiveSettings::max_write_attempts`] times in total.

use crate::adapters::database::DatabaseClient;
use crate::adapters::generator::FakeValueGenerator;
use crate::config::schema::LiveConfig;
use crate::core::live::statement::{changed_columns, update_statement};
use crate::core::live::summary::{LiveSummary, TableSummary};
use crate::domain::context::ResultExt;
use crate::domain::{Result, RowContext, ScrubError};
use crate::scrub::filter::{FilterOptions, UniquenessFilter};
use crate::scrub::row_scrubber::RowScrubber;
use crate::scrub::table::TableSpec;
use crate::scrub::validator::ScopedUniqueness;
use crate::{log_error_with_context, log_retry_attempt, log_row_progress};
use crate::{log_table_complete, log_table_start};
use futures::TryStreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Tuning of a live run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSettings {
    /// Total write attempts per row, the first one included
    pub max_write_attempts: u32,

    /// Rows between progress log lines
    pub progress_interval: u64,

    /// Filter slots per expected unique value
    pub filter_size_multiplier: u64,

    /// Smallest filter ever allocated
    pub min_filter_size: usize,

    /// Hashing parameters of per-table filters; the size is computed per table
    pub filter: FilterOptions,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self::from_config(&LiveConfig::default(), &FilterOptions::default())
    }
}

impl LiveSettings {
    pub fn from_config(live: &LiveConfig, filter: &FilterOptions) -> Self {
        Self {
            max_write_attempts: live.max_write_attempts,
            progress_interval: live.progress_interval,
            filter_size_multiplier: live.filter_size_multiplier,
            min_filter_size: live.min_filter_size,
            filter: filter.clone(),
        }
    }

    /// Filter size for a table: rows x unique columns x multiplier, floored
    pub fn filter_size(&self, estimated_rows: u64, unique_columns: usize) -> usize {
        let wanted = estimated_rows
            .saturating_mul(unique_columns as u64)
            .saturating_mul(self.filter_size_multiplier);
        usize::try_from(wanted)
            .unwrap_or(usize::MAX)
            .max(self.min_filter_size)
    }
}

/// Where row updates go
#[derive(Clone)]
pub enum WriteTarget {
    /// Statements are logged and sampled, never executed
    DryRun,

    /// Statements are executed on this client
    Database(Arc<dyn DatabaseClient>),
}

impl WriteTarget {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, WriteTarget::DryRun)
    }
}

impl std::fmt::Debug for WriteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteTarget::DryRun => f.write_str("DryRun"),
            WriteTarget::Database(_) => f.write_str("Database"),
        }
    }
}

/// Scrubs tables of a live database
pub struct LiveProcessor {
    tables: Vec<TableSpec>,
    reader: Arc<dyn DatabaseClient>,
    target: WriteTarget,
    settings: LiveSettings,
    generator: Box<dyn FakeValueGenerator + Send>,
}

impl LiveProcessor {
    pub fn new(
        tables: Vec<TableSpec>,
        reader: Arc<dyn DatabaseClient>,
        target: WriteTarget,
        settings: LiveSettings,
        generator: Box<dyn FakeValueGenerator + Send>,
    ) -> Self {
        Self {
            tables,
            reader,
            target,
            settings,
            generator,
        }
    }

    /// Restricts the run to the named tables, keeping configuration order
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a name is not a configured table.
    pub fn only_tables(mut self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        if let Some(unknown) = names
            .iter()
            .find(|name| !self.tables.iter().any(|t| t.name() == name.as_str()))
        {
            return Err(ScrubError::Configuration(format!(
                "Table '{}' is not configured",
                unknown
            )));
        }

        self.tables.retain(|t| names.iter().any(|n| n == t.name()));
        Ok(self)
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn is_dry_run(&self) -> bool {
        self.target.is_dry_run()
    }

    /// Scrubs every table in configuration order
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error: a connection failure, a row still
    /// conflicting after the last write attempt, or any other database error.
    /// Rows already written stay written.
    pub async fn run(&mut self) -> Result<LiveSummary> {
        let started = Instant::now();
        let mut summary = LiveSummary::new(self.target.is_dry_run());

        tracing::info!(
            tables = self.tables.len(),
            dry_run = self.target.is_dry_run(),
            "Starting live scrub"
        );

        let run = TableRun {
            reader: self.reader.as_ref(),
            target: &self.target,
            settings: &self.settings,
        };

        for table in &self.tables {
            let table_summary = run.scrub_table(table, self.generator.as_mut()).await?;
            summary.tables.push(table_summary);
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}

/// Borrowed state shared by every table of a run
struct TableRun<'a> {
    reader: &'a dyn DatabaseClient,
    target: &'a WriteTarget,
    settings: &'a LiveSettings,
}

impl TableRun<'_> {
    async fn scrub_table(
        &self,
        table: &TableSpec,
        generator: &mut (dyn FakeValueGenerator + Send),
    ) -> Result<TableSummary> {
        let started = Instant::now();

        let inspecting = || format!("Failed to inspect table '{}'", table.name());
        let primary_key = self
            .reader
            .primary_key(table.name())
            .await
            .with_context(inspecting)?;
        let estimated_rows = self
            .reader
            .count_rows(table.name())
            .await
            .with_context(inspecting)?;
        let unique: HashSet<String> = self
            .reader
            .unique_columns(table.name())
            .await
            .with_context(inspecting)?
            .into_iter()
            .filter(|column| table.has_column(column))
            .collect();

        let mut summary = TableSummary::new(table.name(), primary_key.as_str());
        summary.estimated_rows = estimated_rows;
        summary.unique_columns = unique.iter().cloned().collect();
        summary.unique_columns.sort();

        log_table_start!(table.name(), primary_key, estimated_rows);
        tracing::info!(
            table = %table.name(),
            unique_columns = ?summary.unique_columns,
            "Unique scrubbed columns"
        );

        let mut filter = if unique.is_empty() {
            None
        } else {
            let size = self.settings.filter_size(estimated_rows, unique.len());
            tracing::debug!(table = %table.name(), size, "Allocating uniqueness filter");
            Some(UniquenessFilter::new(self.settings.filter.with_size(size))?)
        };

        let scrubber = RowScrubber::new(table);
        let mut rows = self.reader.stream_rows(table.name());

        while let Some(row) = rows.try_next().await.map_err(|e| {
            if self.reader.is_connection_error(&e) {
                log_error_with_context!(&e, format!("reading table {}", table.name()));
            }
            e
        })? {
            summary.rows_read += 1;

            let key_value = row.get(&primary_key).cloned().flatten();
            match key_value {
                Some(key_value) => {
                    self.scrub_row(
                        &scrubber,
                        &row,
                        (&primary_key, &key_value),
                        &unique,
                        filter.as_mut(),
                        &mut *generator,
                        &mut summary,
                    )
                    .await?;
                }
                None => {
                    tracing::warn!(
                        table = %table.name(),
                        primary_key = %primary_key,
                        "Row has no primary key value; skipped"
                    );
                    summary.rows_without_key += 1;
                }
            }

            if self.settings.progress_interval > 0
                && summary.rows_read % self.settings.progress_interval == 0
            {
                log_row_progress!(table.name(), summary.rows_read, estimated_rows);
            }
        }

        let duration = started.elapsed();
        log_table_complete!(table.name(), summary.rows_read, summary.rows_updated, duration);
        Ok(summary.with_duration(duration))
    }

    /// Scrubs and writes one row, re-running it after duplicate-key conflicts
    #[allow(clippy::too_many_arguments)]
    async fn scrub_row(
        &self,
        scrubber: &RowScrubber<'_>,
        row: &RowContext,
        (primary_key, key_value): (&str, &str),
        unique: &HashSet<String>,
        mut filter: Option<&mut UniquenessFilter>,
        generator: &mut (dyn FakeValueGenerator + Send),
        summary: &mut TableSummary,
    ) -> Result<()> {
        let table = scrubber.table();
        let max_attempts = self.settings.max_write_attempts.max(1);
        let mut attempt = 1;

        loop {
            let mut scrubbed = row.clone();
            let report = {
                let mut factory = ScopedUniqueness::new(filter.as_deref_mut(), unique);
                scrubber.scrub(&mut scrubbed, &mut factory, &mut *generator)?
            };

            let changes = changed_columns(table, row, &scrubbed);
            if changes.is_empty() {
                summary.rows_unchanged += 1;
                return Ok(());
            }

            let statement =
                update_statement(self.reader, table.name(), primary_key, key_value, &changes);

            let client = match self.target {
                WriteTarget::DryRun => {
                    tracing::info!("[DRY RUN] {}", statement);
                    summary.record_dry_run(&statement);
                    summary.rows_updated += 1;
                    summary.exhausted_values += report.exhausted().count() as u64;
                    return Ok(());
                }
                WriteTarget::Database(client) => client,
            };

            match client.execute(&statement).await {
                Ok(affected) if affected != 1 => {
                    let err = ScrubError::Database(format!(
                        "UPDATE of table '{}' keyed on {}={} affected {} rows, expected 1",
                        table.name(),
                        primary_key,
                        key_value,
                        affected
                    ));
                    log_error_with_context!(
                        &err,
                        format!("{} {}={}", table.name(), primary_key, key_value)
                    );
                    return Err(err);
                }
                Ok(_) => {
                    summary.rows_updated += 1;
                    summary.exhausted_values += report.exhausted().count() as u64;
                    return Ok(());
                }
                Err(e) if client.is_duplicate_key_error(&e) => {
                    if attempt >= max_attempts {
                        tracing::error!(
                            table = %table.name(),
                            primary_key = %primary_key,
                            key = %key_value,
                            attempts = attempt,
                            error = %e,
                            "Row still conflicts after the last write attempt"
                        );
                        return Err(e);
                    }
                    log_retry_attempt!(
                        attempt,
                        max_attempts,
                        format!("duplicate key on {} {}={}", table.name(), primary_key, key_value)
                    );
                    summary.collision_retries += 1;
                    attempt += 1;
                }
                Err(e) if client.is_connection_error(&e) => {
                    log_error_with_context!(
                        &e,
                        format!("{} {}={}", table.name(), primary_key, key_value)
                    );
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::live::testing::MockDatabase;
    use crate::domain::row::row_from_pairs;
    use crate::scrub::strategy::testing::CountingGenerator;
    use crate::scrub::table::{ColumnOptions, ColumnSpec, ScrubKind};

    fn users() -> TableSpec {
        TableSpec::new(
            "users",
            vec![
                ColumnSpec::new("email", ScrubKind::Email, ColumnOptions::default()),
                ColumnSpec::new("nickname", ScrubKind::Username, ColumnOptions::default()),
            ],
        )
        .unwrap()
    }

    fn orders() -> TableSpec {
        TableSpec::new(
            "orders",
            vec![ColumnSpec::new(
                "note",
                ScrubKind::Text,
                ColumnOptions::default(),
            )],
        )
        .unwrap()
    }

    fn settings() -> LiveSettings {
        LiveSettings {
            min_filter_size: 1_000,
            ..LiveSettings::default()
        }
    }

    fn processor(db: &Arc<MockDatabase>, target: WriteTarget) -> LiveProcessor {
        LiveProcessor::new(
            vec![users(), orders()],
            db.clone(),
            target,
            settings(),
            Box::new(CountingGenerator::default()),
        )
    }

    fn database() -> Arc<MockDatabase> {
        Arc::new(
            MockDatabase::new()
                .with_table(
                    "users",
                    "id",
                    &["email"],
                    vec![
                        row_from_pairs([
                            ("id", Some("1")),
                            ("email", Some("a@x.com")),
                            ("nickname", Some("ann")),
                        ]),
                        row_from_pairs([
                            ("id", Some("2")),
                            ("email", Some("b@x.com")),
                            ("nickname", None),
                        ]),
                    ],
                )
                .with_table("orders", "order_id", &[], vec![]),
        )
    }

    #[test]
    fn test_filter_size_is_floored() {
        let settings = LiveSettings {
            filter_size_multiplier: 10,
            min_filter_size: 100_000,
            ..LiveSettings::default()
        };
        assert_eq!(settings.filter_size(5_000, 3), 150_000);
        assert_eq!(settings.filter_size(10, 1), 100_000);
        assert_eq!(settings.filter_size(0, 0), 100_000);
    }

    #[tokio::test]
    async fn test_updates_changed_rows() {
        let db = database();
        let mut processor = processor(&db, WriteTarget::Database(db.clone()));

        let summary = processor.run().await.unwrap();
        let users = summary.table("users").unwrap();

        assert_eq!(users.primary_key, "id");
        assert_eq!(users.unique_columns, vec!["email".to_string()]);
        assert_eq!(users.rows_read, 2);
        assert_eq!(users.rows_updated, 2);

        let executed = db.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[0].starts_with("UPDATE \"users\" SET \"email\" = '"));
        assert!(executed[0].ends_with("WHERE \"id\" = '1'"));
        assert!(!executed[0].contains("a@x.com"));
        assert!(executed[0].contains("\"nickname\" = '"));
    }

    #[tokio::test]
    async fn test_rows_without_configured_columns_are_not_written() {
        let db = Arc::new(MockDatabase::new().with_table(
            "orders",
            "order_id",
            &[],
            vec![row_from_pairs([("order_id", Some("7")), ("total", Some("12.50"))])],
        ));
        let mut processor = LiveProcessor::new(
            vec![orders()],
            db.clone(),
            WriteTarget::Database(db.clone()),
            settings(),
            Box::new(CountingGenerator::default()),
        );

        let summary = processor.run().await.unwrap();

        assert_eq!(summary.tables[0].rows_unchanged, 1);
        assert_eq!(summary.tables[0].unique_columns, Vec::<String>::new());
        assert!(db.executed().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_never_writes() {
        let db = database();
        let mut processor = processor(&db, WriteTarget::DryRun);

        let summary = processor.run().await.unwrap();

        assert!(summary.dry_run);
        assert!(db.executed().is_empty());
        let users = summary.table("users").unwrap();
        assert_eq!(users.rows_updated, 2);
        assert_eq!(users.dry_run_samples.len(), 2);
        assert!(users.dry_run_samples[0].starts_with("UPDATE \"users\""));
    }

    #[tokio::test]
    async fn test_conflict_then_success_retries_once() {
        let db = database();
        db.fail_next_writes_with_conflict(1);
        let mut processor = processor(&db, WriteTarget::Database(db.clone()))
            .only_tables(&["users".to_string()])
            .unwrap();

        let summary = processor.run().await.unwrap();

        // two attempts for the first row, one for the second
        assert_eq!(db.executed().len(), 3);
        assert_eq!(summary.collision_retries(), 1);
        assert_eq!(summary.rows_updated(), 2);
    }

    #[tokio::test]
    async fn test_retry_draws_new_candidates() {
        let db = database();
        db.fail_next_writes_with_conflict(1);
        let mut processor = processor(&db, WriteTarget::Database(db.clone()));
        processor.run().await.unwrap();

        let executed = db.executed();
        assert_ne!(executed[0], executed[1]);
        assert!(executed[1].ends_with("WHERE \"id\" = '1'"));
    }

    #[tokio::test]
    async fn test_persistent_conflict_is_fatal_after_five_attempts() {
        let db = database();
        db.fail_next_writes_with_conflict(u32::MAX);
        let mut processor = processor(&db, WriteTarget::Database(db.clone()));

        let err = processor.run().await.unwrap_err();

        assert!(err.is_duplicate_key());
        assert_eq!(db.executed().len(), 5);
    }

    #[tokio::test]
    async fn test_connection_error_aborts_without_retry() {
        let db = database();
        db.fail_next_write_with_connection_error();
        let mut processor = processor(&db, WriteTarget::Database(db.clone()));

        let err = processor.run().await.unwrap_err();

        assert!(err.is_connection());
        assert_eq!(db.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_propagate_without_retry() {
        let db = database();
        db.fail_next_write_with(ScrubError::Database("syntax error".to_string()));
        let mut processor = processor(&db, WriteTarget::Database(db.clone()));

        let err = processor.run().await.unwrap_err();

        assert!(matches!(err, ScrubError::Database(_)));
        assert_eq!(db.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_update_not_hitting_exactly_one_row_is_fatal() {
        for affected in [0, 3] {
            let db = database();
            db.affect_next_writes(&[affected]);
            let mut processor = processor(&db, WriteTarget::Database(db.clone()));

            let err = processor.run().await.unwrap_err();

            assert!(matches!(err, ScrubError::Database(_)), "affected {affected}");
            let message = err.to_string();
            assert!(message.contains("'users'"), "{message}");
            assert!(message.contains("id=1"), "{message}");
            assert!(message.contains(&format!("affected {affected} rows")), "{message}");
            assert_eq!(db.executed().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_rows_without_key_are_skipped() {
        let db = Arc::new(MockDatabase::new().with_table(
            "users",
            "id",
            &[],
            vec![row_from_pairs([("id", None), ("email", Some("a@x.com"))])],
        ));
        let mut processor = LiveProcessor::new(
            vec![users()],
            db.clone(),
            WriteTarget::Database(db.clone()),
            settings(),
            Box::new(CountingGenerator::default()),
        );

        let summary = processor.run().await.unwrap();

        assert_eq!(summary.tables[0].rows_without_key, 1);
        assert!(db.executed().is_empty());
    }

    #[test]
    fn test_only_tables_rejects_unknown_names() {
        let db = database();
        let result =
            processor(&db, WriteTarget::DryRun).only_tables(&["invoices".to_string()]);
        assert!(matches!(result, Err(ScrubError::Configuration(_))));

        let processor = processor(&db, WriteTarget::DryRun)
            .only_tables(&["orders".to_string()])
            .unwrap();
        assert_eq!(processor.tables().len(), 1);
        assert_eq!(processor.tables()[0].name(), "orders");
    }
}

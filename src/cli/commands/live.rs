//! Live command implementation
//!
//! This module implements the `live` command, which scrubs the configured
//! tables of a connected database in place.

use super::{exit_code_for, write_report, EXIT_CONFIGURATION, EXIT_OK};
use crate::adapters::database;
use crate::adapters::generator::FakerGenerator;
use crate::adapters::postgresql::client::redact;
use crate::config::load_config;
use crate::core::live::{LiveProcessor, LiveSettings, LiveSummary, WriteTarget};
use clap::Args;
use secrecy::ExposeSecret;
use std::io::{self, Write};
use std::path::PathBuf;

/// Arguments for the live command
#[derive(Args, Debug)]
pub struct LiveArgs {
    /// Compute and log the updates without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Only scrub these configured tables (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub table: Vec<String>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl LiveArgs {
    /// Execute the live command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting live command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let dry_run = self.dry_run || config.application.dry_run;

        let db_config = match config.require_database() {
            Ok(db_config) => db_config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let tables = match config.table_specs() {
            Ok(tables) => tables,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("DRY RUN MODE - No data will be written to the database");
            println!();
        }

        if !self.yes && !dry_run {
            let names: Vec<&str> = if self.table.is_empty() {
                tables.iter().map(|t| t.name()).collect()
            } else {
                self.table.iter().map(String::as_str).collect()
            };

            println!("Live Scrub Configuration:");
            println!(
                "  Database: {}",
                redact(db_config.connection_string.expose_secret().as_ref())
            );
            println!("  Tables: {}", names.join(", "));
            println!("  Max write attempts: {}", config.live.max_write_attempts);
            println!();
            println!("Rows will be overwritten in place. This cannot be undone.");
            print!("Proceed with live scrub? [y/N]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Live scrub cancelled.");
                return Ok(EXIT_OK);
            }
        }

        let reader = match database::connect(db_config).await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect");
                eprintln!("Failed to connect to database: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        // Writes go through their own connection; a dry run never opens one
        let target = if dry_run {
            WriteTarget::DryRun
        } else {
            match database::connect(db_config).await {
                Ok(client) => WriteTarget::Database(client),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to open write connection");
                    eprintln!("Failed to connect to database: {e}");
                    return Ok(exit_code_for(&e));
                }
            }
        };

        let settings = LiveSettings::from_config(&config.live, &config.uniqueness_filter);
        let generator = Box::new(FakerGenerator::from_seed(config.generator.seed));

        let mut processor =
            match LiveProcessor::new(tables, reader, target, settings, generator)
                .only_tables(&self.table)
            {
                Ok(processor) => processor,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(EXIT_CONFIGURATION);
                }
            };

        let summary = match processor.run().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Live scrub failed");
                eprintln!("Live scrub failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        if let Some(path) = &self.report {
            write_report(path, "live", &summary)?;
        }

        Ok(EXIT_OK)
    }
}

fn print_summary(summary: &LiveSummary) {
    println!();
    println!("Live Scrub Summary{}:", if summary.dry_run { " (dry run)" } else { "" });
    for table in &summary.tables {
        println!(
            "  {}: {} read, {} updated, {} unchanged, {} retries (key: {}, unique: [{}])",
            table.table,
            table.rows_read,
            table.rows_updated,
            table.rows_unchanged,
            table.collision_retries,
            table.primary_key,
            table.unique_columns.join(", ")
        );
        for statement in &table.dry_run_samples {
            println!("    {statement}");
        }
    }
    if summary.exhausted_values() > 0 {
        println!(
            "  Warning: {} values could not be made unique and were written as NULL",
            summary.exhausted_values()
        );
    }
    println!("  Duration: {} ms", summary.duration_ms);
}

//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Scrub configuration file.

use super::{exit_code_for, EXIT_OK};
use crate::adapters::postgresql::client::redact;
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // Loading validates and resolves every table's column order
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let tables = match config.table_specs() {
            Ok(tables) => tables,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Uniqueness Filter: size={}, hash_count={}, bucket_width={}",
            config.uniqueness_filter.size,
            config.uniqueness_filter.hash_count,
            config.uniqueness_filter.bucket_width
        );
        match config.generator.seed {
            Some(seed) => println!("  Generator Seed: {seed}"),
            None => println!("  Generator Seed: random"),
        }
        match &config.database {
            Some(db) => {
                println!("  Database Adapter: {}", db.adapter);
                println!(
                    "  Database: {}",
                    redact(db.connection_string.expose_secret().as_ref())
                );
            }
            None => println!("  Database: not configured (dump mode only)"),
        }

        println!();
        println!("Tables:");
        for table in &tables {
            println!("  {}", table.name());
            for column in table.columns() {
                let dependencies = column.dependencies();
                if dependencies.is_empty() {
                    println!("    - {} ({})", column.name(), column.kind());
                } else {
                    println!(
                        "    - {} ({}, depends on {})",
                        column.name(),
                        column.kind(),
                        dependencies.join(", ")
                    );
                }
            }
            let order: Vec<&str> = table.sorted_columns().map(|c| c.name()).collect();
            println!("    order: {}", order.join(" -> "));
        }
        println!();

        Ok(EXIT_OK)
    }
}

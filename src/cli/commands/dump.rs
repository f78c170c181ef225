//! Dump command implementation
//!
//! Scrubs a SQL dump from a file or stdin into a file or stdout. Messages go
//! to stderr so the scrubbed dump can be piped.

use super::{exit_code_for, write_report, EXIT_OK};
use crate::adapters::generator::FakerGenerator;
use crate::config::load_config;
use crate::core::dump::DumpProcessor;
use clap::Args;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// SQL dump to read (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// File to write the scrubbed dump to (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl DumpArgs {
    /// Execute the dump command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting dump command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
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

        let generator = Box::new(FakerGenerator::from_seed(config.generator.seed));
        let mut processor =
            match DumpProcessor::new(tables, config.uniqueness_filter.clone(), generator) {
                Ok(processor) => processor,
                Err(e) => {
                    eprintln!("Failed to initialize dump processor: {e}");
                    return Ok(exit_code_for(&e));
                }
            };

        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(io::stdin().lock()),
        };
        let writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };

        let summary = match processor.process(reader, writer) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Dump scrub failed");
                eprintln!("Dump scrub failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        eprintln!(
            "Scrubbed {} rows in {} statements ({} lines read, {} statements left untouched)",
            summary.rows_scrubbed,
            summary.statements_rewritten,
            summary.lines_read,
            summary.statements_skipped
        );
        if summary.exhausted_values > 0 {
            eprintln!(
                "Warning: {} values could not be made unique and were written as NULL",
                summary.exhausted_values
            );
        }

        if let Some(path) = &self.report {
            write_report(path, "dump", &summary)?;
        }

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{EXIT_CONFIGURATION, EXIT_OK};
    use std::io::Write as _;

    const CONFIG: &str = r#"
[generator]
seed = 7

[[tables]]
name = "users"

[[tables.columns]]
name = "email"
kind = "email"
"#;

    #[tokio::test]
    async fn test_dump_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("scrub.toml");
        let input = dir.path().join("in.sql");
        let output = dir.path().join("out.sql");
        let report = dir.path().join("report.json");
        std::fs::write(&config_path, CONFIG).unwrap();
        let mut file = File::create(&input).unwrap();
        writeln!(file, "-- header").unwrap();
        writeln!(
            file,
            "INSERT INTO `users` (`id`, `email`) VALUES (1, 'a@x.com');"
        )
        .unwrap();
        drop(file);

        let args = DumpArgs {
            input: Some(input),
            output: Some(output.clone()),
            report: Some(report.clone()),
        };
        let code = args.execute(config_path.to_str().unwrap()).await.unwrap();

        assert_eq!(code, EXIT_OK);
        let scrubbed = std::fs::read_to_string(&output).unwrap();
        assert!(scrubbed.starts_with("-- header\n"));
        assert!(!scrubbed.contains("a@x.com"));
        assert!(report.exists());
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = DumpArgs {
            input: None,
            output: None,
            report: None,
        };
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIGURATION);
    }
}

//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIGURATION, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Sample configuration written by `scrub init`
pub const SAMPLE_CONFIG: &str = r#"# Scrub Configuration File
# Anonymizes personally identifying data in SQL dumps and live databases

[application]
log_level = "info"
# Compute live updates without executing them
dry_run = false

[uniqueness_filter]
size = 1000000
hash_count = 5
seed = 1
bucket_width = 8
raise_on_overflow = false

[generator]
# Uncomment for reproducible output
# seed = 42

# Required for `scrub live` only
# [database]
# adapter = "postgresql"
# connection_string = "${SCRUB_DATABASE_URL}"
# connection_timeout_seconds = 30
# statement_timeout_seconds = 60

[live]
max_write_attempts = 5
progress_interval = 10000
filter_size_multiplier = 10
min_filter_size = 100000

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never

# Column kinds: email, name, first_name, last_name, username, text.
# Any other kind produces generic words.

[[tables]]
name = "users"

[[tables.columns]]
name = "fullname"
kind = "name"

[[tables.columns]]
name = "email"
kind = "email"
depends_on = "fullname"
name_column = "fullname"
# preserve_domain = true
# domain = "example.org"

[[tables.columns]]
name = "login"
kind = "text"
type = "username"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "scrub.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIGURATION);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Declare your tables and columns in {}", self.output);
                println!("  2. For live mode, uncomment [database] and set SCRUB_DATABASE_URL");
                println!("  3. Validate configuration: scrub validate-config");
                println!("  4. Scrub a dump: scrub dump --input dump.sql --output scrubbed.sql");
                println!("  5. Or preview a live run: scrub live --dry-run");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }
}

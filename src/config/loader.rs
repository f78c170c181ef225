//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::ScrubError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AppConfig
/// 4. Applies environment variable overrides (SCRUB_* prefix)
/// 5. Validates the configuration and resolves every table's column order
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed, a
/// referenced environment variable is unset, or validation fails, and
/// [`ScrubError::CircularDependency`] for a dependency cycle.
///
/// # Examples
///
/// ```no_run
/// use scrub::config::loader::load_config;
///
/// let config = load_config("scrub.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScrubError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScrubError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Same as [`load_config`] for configuration text already in memory
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| ScrubError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ScrubError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    // Surfaces dependency cycles before any processing starts
    config.table_specs()?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ScrubError::Other(format!("Invalid pattern: {e}")))?;
    let mut missing_vars: Vec<String> = Vec::new();

    let lines: Vec<String> = input
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }

            re.replace_all(line, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                match std::env::var(var_name) {
                    Ok(value) => value,
                    Err(_) => {
                        if !missing_vars.iter().any(|v| v == var_name) {
                            missing_vars.push(var_name.to_string());
                        }
                        String::new()
                    }
                }
            })
            .into_owned()
        })
        .collect();

    if !missing_vars.is_empty() {
        return Err(ScrubError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using SCRUB_* prefix
///
/// Environment variables follow the pattern: SCRUB_<SECTION>_<KEY>
/// For example: SCRUB_APPLICATION_LOG_LEVEL, SCRUB_DATABASE_CONNECTION_STRING.
/// Values that do not parse are ignored.
fn apply_env_overrides(config: &mut AppConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("SCRUB_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SCRUB_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(config.application.dry_run);
    }

    // Generator overrides
    if let Ok(val) = std::env::var("SCRUB_GENERATOR_SEED") {
        if let Ok(seed) = val.parse() {
            config.generator.seed = Some(seed);
        }
    }

    // Uniqueness filter overrides
    if let Ok(val) = std::env::var("SCRUB_UNIQUENESS_FILTER_SIZE") {
        if let Ok(size) = val.parse() {
            config.uniqueness_filter.size = size;
        }
    }
    if let Ok(val) = std::env::var("SCRUB_UNIQUENESS_FILTER_HASH_COUNT") {
        if let Ok(count) = val.parse() {
            config.uniqueness_filter.hash_count = count;
        }
    }

    // Database overrides (only if the section is present)
    if let Some(ref mut database) = config.database {
        if let Ok(val) = std::env::var("SCRUB_DATABASE_ADAPTER") {
            database.adapter = val;
        }
        if let Ok(val) = std::env::var("SCRUB_DATABASE_CONNECTION_STRING") {
            database.connection_string = super::secret_string(val);
        }
        if let Ok(val) = std::env::var("SCRUB_DATABASE_STATEMENT_TIMEOUT_SECONDS") {
            if let Ok(seconds) = val.parse() {
                database.statement_timeout_seconds = seconds;
            }
        }
    }

    // Live overrides
    if let Ok(val) = std::env::var("SCRUB_LIVE_MAX_WRITE_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.live.max_write_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("SCRUB_LIVE_PROGRESS_INTERVAL") {
        if let Ok(interval) = val.parse() {
            config.live.progress_interval = interval;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SCRUB_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(config.logging.local_enabled);
    }
    if let Ok(val) = std::env::var("SCRUB_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

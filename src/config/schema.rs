//! Configuration schema types
//!
//! This module defines the configuration structure for Scrub. Every section
//! except `[[tables]]` has defaults, so a file may consist of table
//! declarations alone.

use crate::adapters::database::factory::SUPPORTED_ADAPTERS;
use crate::config::SecretString;
use crate::domain::{Result, ScrubError};
use crate::scrub::filter::FilterOptions;
use crate::scrub::table::{ColumnOptions, ColumnSpec, ScrubKind, TableSpec};
use serde::Deserialize;
use std::collections::HashSet;

/// Main Scrub configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Parameters of the uniqueness filter; live mode resizes it per table
    #[serde(default)]
    pub uniqueness_filter: FilterOptions,

    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Connection settings, required by live mode only
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tables to scrub, in processing order
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// Dependency cycles are not detected here; [`AppConfig::table_specs`]
    /// reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.application.validate()?;
        self.uniqueness_filter.validate()?;
        self.live.validate()?;
        self.logging.validate()?;

        if let Some(database) = &self.database {
            database.validate()?;
        }

        if self.tables.is_empty() {
            return Err("at least one [[tables]] entry is required".to_string());
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            table.validate()?;
            if !seen.insert(table.name.as_str()) {
                return Err(format!("table '{}' is configured more than once", table.name));
            }
        }

        Ok(())
    }

    /// Builds the immutable table specs shared by the processors
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::CircularDependency`] if a table's columns depend
    /// on each other in a cycle.
    pub fn table_specs(&self) -> Result<Vec<TableSpec>> {
        self.tables.iter().map(TableConfig::to_spec).collect()
    }

    /// The `[database]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the section is missing.
    pub fn require_database(&self) -> Result<&DatabaseConfig> {
        self.database.as_ref().ok_or_else(|| {
            ScrubError::Configuration("a [database] section is required for live mode".to_string())
        })
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Compute live-mode updates without executing them
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Fake-value generator settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for reproducible output; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Adapter name, one of [`SUPPORTED_ADAPTERS`]
    #[serde(default = "default_adapter")]
    pub adapter: String,

    /// Connection string, URL or keyword form
    /// Stored securely in memory and automatically zeroized on drop
    pub connection_string: SecretString,

    #[serde(default = "default_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    #[serde(default = "default_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        use secrecy::ExposeSecret;

        let adapter = self.adapter.to_ascii_lowercase();
        if !SUPPORTED_ADAPTERS.contains(&adapter.as_str()) {
            return Err(format!(
                "Unsupported database.adapter '{}'. Must be one of: {}",
                self.adapter,
                SUPPORTED_ADAPTERS.join(", ")
            ));
        }

        if self.connection_string.expose_secret().is_empty() {
            return Err("database.connection_string cannot be empty".to_string());
        }

        if self.connection_timeout_seconds == 0 {
            return Err("database.connection_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Live mode tuning
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiveConfig {
    /// Write attempts per row, the first one included
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,

    /// Rows between progress log lines
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Filter slots per expected unique value
    #[serde(default = "default_filter_size_multiplier")]
    pub filter_size_multiplier: u64,

    #[serde(default = "default_min_filter_size")]
    pub min_filter_size: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: default_max_write_attempts(),
            progress_interval: default_progress_interval(),
            filter_size_multiplier: default_filter_size_multiplier(),
            min_filter_size: default_min_filter_size(),
        }
    }
}

impl LiveConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.max_write_attempts == 0 {
            return Err("live.max_write_attempts must be > 0".to_string());
        }
        if self.progress_interval == 0 {
            return Err("live.progress_interval must be > 0".to_string());
        }
        if self.filter_size_multiplier == 0 {
            return Err("live.filter_size_multiplier must be > 0".to_string());
        }
        if self.min_filter_size == 0 {
            return Err("live.min_filter_size must be > 0".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

/// One `[[tables]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub name: String,

    /// Columns to scrub, in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl TableConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("tables.name cannot be empty".to_string());
        }
        if self.columns.is_empty() {
            return Err(format!("table '{}' has no columns", self.name));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(format!("table '{}' has a column without a name", self.name));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(format!(
                    "column '{}' appears more than once in table '{}'",
                    column.name, self.name
                ));
            }
        }
        Ok(())
    }

    /// Builds the spec, resolving the column order
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::CircularDependency`] for dependency cycles.
    pub fn to_spec(&self) -> Result<TableSpec> {
        TableSpec::new(
            &self.name,
            self.columns.iter().map(ColumnConfig::to_spec).collect(),
        )
    }
}

/// One `[[tables.columns]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,

    /// Scrub kind tag: email, name, first_name, last_name, username, text, or
    /// anything else for generic words
    pub kind: String,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub preserve_domain: bool,

    #[serde(default)]
    pub name_column: Option<String>,

    #[serde(default)]
    pub depends_on: Option<DependsOn>,

    /// Sub-kind for name and text columns
    #[serde(default, rename = "type")]
    pub sub_kind: Option<String>,
}

impl ColumnConfig {
    pub fn to_spec(&self) -> ColumnSpec {
        ColumnSpec::new(
            &self.name,
            ScrubKind::parse(&self.kind),
            ColumnOptions {
                domain: self.domain.clone(),
                preserve_domain: self.preserve_domain,
                name_column: self.name_column.clone(),
                depends_on: self
                    .depends_on
                    .clone()
                    .map(DependsOn::into_vec)
                    .unwrap_or_default(),
                sub_kind: self.sub_kind.clone(),
            },
        )
    }
}

/// `depends_on` accepts one column name or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    One(String),
    Many(Vec<String>),
}

impl DependsOn {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            DependsOn::One(name) => vec![name],
            DependsOn::Many(names) => names,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_adapter() -> String {
    "postgresql".to_string()
}

fn default_connection_timeout_seconds() -> u64 {
    30
}

fn default_statement_timeout_seconds() -> u64 {
    60
}

fn default_max_write_attempts() -> u32 {
    5
}

fn default_progress_interval() -> u64 {
    10_000
}

fn default_filter_size_multiplier() -> u64 {
    10
}

fn default_min_filter_size() -> usize {
    100_000
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap()
    }

    const MINIMAL: &str = r#"
[[tables]]
name = "users"

[[tables.columns]]
name = "email"
kind = "email"
"#;

    #[test]
    fn test_defaults() {
        let config = parse(MINIMAL);

        assert_eq!(config.application.log_level, "info");
        assert!(!config.application.dry_run);
        assert_eq!(config.uniqueness_filter, FilterOptions::default());
        assert_eq!(config.live, LiveConfig::default());
        assert_eq!(config.live.max_write_attempts, 5);
        assert!(config.database.is_none());
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
            dry_run: false,
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_depends_on_accepts_string_or_list() {
        let config = parse(
            r#"
[[tables]]
name = "users"

[[tables.columns]]
name = "fullname"
kind = "name"

[[tables.columns]]
name = "login"
kind = "username"

[[tables.columns]]
name = "email"
kind = "email"
depends_on = "fullname"
name_column = "fullname"

[[tables.columns]]
name = "bio"
kind = "text"
depends_on = ["fullname", "login"]
"#,
        );

        let columns = &config.tables[0].columns;
        assert_eq!(
            columns[2].depends_on,
            Some(DependsOn::One("fullname".to_string()))
        );
        assert_eq!(
            columns[3].to_spec().options().depends_on,
            vec!["fullname".to_string(), "login".to_string()]
        );
    }

    #[test]
    fn test_type_option_maps_to_sub_kind() {
        let config = parse(
            r#"
[[tables]]
name = "people"

[[tables.columns]]
name = "given"
kind = "name"
type = "first_name"
"#,
        );

        let spec = config.tables[0].columns[0].to_spec();
        assert_eq!(spec.kind(), &ScrubKind::Name);
        assert_eq!(spec.options().sub_kind.as_deref(), Some("first_name"));
    }

    #[test]
    fn test_validation_rejects_empty_and_duplicate_tables() {
        let mut config = parse(MINIMAL);
        config.tables.clear();
        assert!(config.validate().is_err());

        let mut config = parse(MINIMAL);
        config.tables.push(config.tables[0].clone());
        assert!(config
            .validate()
            .unwrap_err()
            .contains("more than once"));
    }

    #[test]
    fn test_validation_rejects_duplicate_columns() {
        let mut config = parse(MINIMAL);
        let column = config.tables[0].columns[0].clone();
        config.tables[0].columns.push(column);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_validation() {
        let mut database = DatabaseConfig {
            adapter: "postgresql".to_string(),
            connection_string: secret_string("postgresql://u:p@localhost/app".to_string()),
            connection_timeout_seconds: 30,
            statement_timeout_seconds: 60,
        };
        assert!(database.validate().is_ok());

        database.adapter = "mysql".to_string();
        assert!(database.validate().unwrap_err().contains("Unsupported"));

        database.adapter = "postgresql".to_string();
        database.connection_string = secret_string(String::new());
        assert!(database.validate().is_err());
    }

    #[test]
    fn test_live_validation() {
        let live = LiveConfig {
            max_write_attempts: 0,
            ..LiveConfig::default()
        };
        assert!(live.validate().is_err());
    }

    #[test]
    fn test_table_specs_reports_cycles() {
        let config = parse(
            r#"
[[tables]]
name = "users"

[[tables.columns]]
name = "a"
kind = "text"
depends_on = "b"

[[tables.columns]]
name = "b"
kind = "text"
depends_on = "a"
"#,
        );

        assert!(config.validate().is_ok());
        let err = config.table_specs().unwrap_err();
        assert!(matches!(err, ScrubError::CircularDependency { .. }));
    }

    #[test]
    fn test_require_database() {
        let config = parse(MINIMAL);
        assert!(config.require_database().unwrap_err().is_configuration());
    }
}

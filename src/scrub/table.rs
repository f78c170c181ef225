//! Table and column scrub specifications
//!
//! A [`TableSpec`] is built once from configuration and shared read-only by
//! the processors. It caches the dependency order of its columns; editing the
//! column set recomputes it.

use crate::domain::{Result, ScrubError};
use crate::scrub::dependency::dependency_order;
use crate::scrub::strategy::ScrubStrategy;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// What kind of data a column holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScrubKind {
    Email,
    Name,
    FirstName,
    LastName,
    Username,
    Text,
    /// Any tag without a dedicated strategy
    Generic(String),
}

impl ScrubKind {
    /// Parses a configuration tag; unknown tags become [`ScrubKind::Generic`]
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "email" => ScrubKind::Email,
            "name" | "full_name" => ScrubKind::Name,
            "first_name" => ScrubKind::FirstName,
            "last_name" => ScrubKind::LastName,
            "username" => ScrubKind::Username,
            "text" => ScrubKind::Text,
            other => ScrubKind::Generic(other.to_string()),
        }
    }

    /// Configuration tag of this kind
    pub fn as_str(&self) -> &str {
        match self {
            ScrubKind::Email => "email",
            ScrubKind::Name => "name",
            ScrubKind::FirstName => "first_name",
            ScrubKind::LastName => "last_name",
            ScrubKind::Username => "username",
            ScrubKind::Text => "text",
            ScrubKind::Generic(tag) => tag,
        }
    }
}

impl fmt::Display for ScrubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column options recognized by the strategies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Domain for generated email addresses
    pub domain: Option<String>,

    /// Reuse the domain of the original address
    pub preserve_domain: bool,

    /// Column whose current value seeds generated email local parts
    pub name_column: Option<String>,

    /// Columns that must be scrubbed before this one
    pub depends_on: Vec<String>,

    /// Sub-kind for name and text columns (`type` in configuration)
    pub sub_kind: Option<String>,
}

/// One configured column
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: String,
    kind: ScrubKind,
    options: ColumnOptions,
    strategy: OnceLock<ScrubStrategy>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ScrubKind, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
            strategy: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ScrubKind {
        &self.kind
    }

    pub fn options(&self) -> &ColumnOptions {
        &self.options
    }

    /// De-duplicated `depends_on` entries in declaration order
    ///
    /// Names that are not columns of the owning table are kept here and
    /// dropped when the table computes its order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.options
            .depends_on
            .iter()
            .map(String::as_str)
            .filter(|dep| seen.insert(*dep))
            .collect()
    }

    /// Strategy for this column, built on first use
    pub fn strategy(&self) -> &ScrubStrategy {
        self.strategy
            .get_or_init(|| ScrubStrategy::for_column(&self.kind, &self.options))
    }
}

/// A table with its configured scrub columns
#[derive(Debug, Clone)]
pub struct TableSpec {
    name: String,
    columns: Vec<ColumnSpec>,
    order: Vec<usize>,
}

impl TableSpec {
    /// Builds a table spec and resolves its column order
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate column names and
    /// [`ScrubError::CircularDependency`] for dependency cycles.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(ScrubError::Configuration(format!(
                    "Duplicate column '{}' in table '{}'",
                    column.name(),
                    name
                )));
            }
        }

        let order = resolve(&name, &columns)?;
        Ok(Self {
            name,
            columns,
            order,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a column, replacing any column of the same name
    ///
    /// The table is left untouched if the new column introduces a cycle.
    pub fn add_column(&mut self, column: ColumnSpec) -> Result<()> {
        let mut columns = self.columns.clone();
        match columns.iter().position(|c| c.name() == column.name()) {
            Some(i) => columns[i] = column,
            None => columns.push(column),
        }

        self.order = resolve(&self.name, &columns)?;
        self.columns = columns;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Columns in dependency order
    pub fn sorted_columns(&self) -> impl Iterator<Item = &ColumnSpec> + '_ {
        self.order.iter().map(move |&i| &self.columns[i])
    }

    /// Returns `true` if `name` is a configured column
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

fn resolve(table: &str, columns: &[ColumnSpec]) -> Result<Vec<usize>> {
    let nodes: Vec<(&str, Vec<&str>)> = columns
        .iter()
        .map(|c| (c.name(), c.dependencies()))
        .collect();
    dependency_order(table, &nodes)
}

//! Dump processor
//!
//! Streams a textual SQL dump and rewrites `INSERT` statements of configured
//! tables. Every other line, and any `INSERT` that does not have the expected
//! shape, is copied byte for byte.
//!
//! Recognized shape, one statement per line:
//!
//! ```text
//! INSERT INTO `users` (`id`, `email`) VALUES (1, 'a@x.com'), (2, 'b@x.com');
//! ```
//!
//! Values are split on commas outside single-quoted runs. This is a regex rule,
//! not a SQL tokenizer: a quote escaped inside a literal unbalances the quote
//! count and can misplace a split, and parentheses inside values can end a
//! tuple early. A tuple whose value count then differs from the column count
//! leaves the whole line untouched.
//!
//! All tables share one uniqueness filter keyed by the raw candidate value.

use crate::adapters::generator::FakeValueGenerator;
use crate::domain::{Result, RowContext, ScrubError};
use crate::scrub::filter::{FilterOptions, UniquenessFilter};
use crate::scrub::row_scrubber::RowScrubber;
use crate::scrub::table::TableSpec;
use crate::scrub::validator::GlobalUniqueness;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

const INSERT_MARKER: &[u8] = b"INSERT INTO";
const INSERT_PATTERN: &str = r"^INSERT INTO `?(\w+)`? \((.*?)\) VALUES (.*\));(.*)$";
const TUPLE_SEPARATOR: &str = r"\),\s*\(";
const VALUE_SEPARATOR: &str = r",(?=(?:[^']*'[^']*')*[^']*$)";
const NULL_LITERAL: &str = "NULL";

/// Counters of one dump run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpSummary {
    pub lines_read: u64,
    pub statements_rewritten: u64,
    /// `INSERT` lines for configured tables that did not have the expected shape
    pub statements_skipped: u64,
    pub rows_scrubbed: u64,
    /// Values that needed the mutation or mask fallback
    pub fallbacks: u64,
    /// Values for which every candidate was rejected
    pub exhausted_values: u64,
    pub duration_ms: u64,
}

impl DumpSummary {
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn log_summary(&self) {
        tracing::info!(
            lines_read = self.lines_read,
            statements_rewritten = self.statements_rewritten,
            statements_skipped = self.statements_skipped,
            rows_scrubbed = self.rows_scrubbed,
            fallbacks = self.fallbacks,
            duration_ms = self.duration_ms,
            "Dump scrubbed"
        );

        if self.exhausted_values > 0 {
            tracing::warn!(
                exhausted_values = self.exhausted_values,
                "Some values could not be made unique and were written as NULL"
            );
        }
    }
}

/// Rewrites `INSERT` statements of a SQL dump
pub struct DumpProcessor {
    tables: HashMap<String, TableSpec>,
    filter: UniquenessFilter,
    generator: Box<dyn FakeValueGenerator + Send>,
    insert: Regex,
    tuple_separator: Regex,
    value_separator: fancy_regex::Regex,
}

impl DumpProcessor {
    /// Creates a processor with a fresh process-wide uniqueness filter
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid filter options.
    pub fn new(
        tables: Vec<TableSpec>,
        filter_options: FilterOptions,
        generator: Box<dyn FakeValueGenerator + Send>,
    ) -> Result<Self> {
        let compile_error =
            |e: &dyn std::fmt::Display| ScrubError::Other(format!("Invalid pattern: {e}"));

        Ok(Self {
            tables: tables
                .into_iter()
                .map(|table| (table.name().to_string(), table))
                .collect(),
            filter: UniquenessFilter::new(filter_options)?,
            generator,
            insert: Regex::new(INSERT_PATTERN).map_err(|e| compile_error(&e))?,
            tuple_separator: Regex::new(TUPLE_SEPARATOR).map_err(|e| compile_error(&e))?,
            value_separator: fancy_regex::Regex::new(VALUE_SEPARATOR)
                .map_err(|e| compile_error(&e))?,
        })
    }

    /// The shared uniqueness filter
    pub fn filter(&self) -> &UniquenessFilter {
        &self.filter
    }

    /// Mutable access to the filter, e.g. to pre-seed known values
    pub fn filter_mut(&mut self) -> &mut UniquenessFilter {
        &mut self.filter
    }

    /// Streams `reader` to `writer`, rewriting configured `INSERT` lines
    ///
    /// # Errors
    ///
    /// Returns I/O errors and uniqueness filter overflow. Output written
    /// before the error stays written.
    pub fn process<R: BufRead, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
    ) -> Result<DumpSummary> {
        let started = Instant::now();
        let mut summary = DumpSummary::default();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            summary.lines_read += 1;

            let (body, terminator) = split_terminator(&line);
            let rewritten = if body.starts_with(INSERT_MARKER) {
                match std::str::from_utf8(body) {
                    Ok(statement) => self.rewrite_insert(statement, &mut summary)?,
                    Err(_) => None,
                }
            } else {
                None
            };

            match rewritten {
                Some(statement) => {
                    writer.write_all(statement.as_bytes())?;
                    writer.write_all(terminator)?;
                    summary.statements_rewritten += 1;
                }
                None => writer.write_all(&line)?,
            }
        }

        writer.flush()?;
        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Returns the rewritten statement, or `None` to pass the line through
    fn rewrite_insert(
        &mut self,
        statement: &str,
        summary: &mut DumpSummary,
    ) -> Result<Option<String>> {
        let Some(captures) = self.insert.captures(statement) else {
            return Ok(None);
        };
        let (Some(table_name), Some(columns_text), Some(values_text)) =
            (captures.get(1), captures.get(2), captures.get(3))
        else {
            return Ok(None);
        };
        let trailer = captures.get(4).map_or("", |m| m.as_str());

        let Some(table) = self
            .tables
            .get(table_name.as_str())
            .filter(|table| !table.columns().is_empty())
        else {
            return Ok(None);
        };

        let columns: Vec<String> = columns_text
            .as_str()
            .split(',')
            .map(|c| c.trim().replace('`', ""))
            .collect();

        let mut tuples = Vec::new();
        for tuple in self.tuple_separator.split(values_text.as_str()) {
            let tuple = tuple.strip_prefix('(').unwrap_or(tuple);
            let tuple = tuple.strip_suffix(')').unwrap_or(tuple);
            let values = split_values(&self.value_separator, tuple)?;
            if values.len() != columns.len() {
                tracing::warn!(
                    table = %table_name.as_str(),
                    columns = columns.len(),
                    values = values.len(),
                    "Tuple shape mismatch; statement left unscrubbed"
                );
                summary.statements_skipped += 1;
                return Ok(None);
            }
            tuples.push(values);
        }

        let scrubber = RowScrubber::new(table);
        let mut rendered = Vec::with_capacity(tuples.len());

        for values in tuples {
            let mut row: RowContext = columns
                .iter()
                .cloned()
                .zip(values.iter().map(|v| parse_value(v)))
                .collect();

            let report = scrubber.scrub(
                &mut row,
                &mut GlobalUniqueness::new(&mut self.filter),
                self.generator.as_mut(),
            )?;
            summary.rows_scrubbed += 1;
            summary.fallbacks += report.fallbacks() as u64;
            summary.exhausted_values += report.exhausted().count() as u64;

            let rendered_values: Vec<String> = columns
                .iter()
                .map(|column| render_value(row.get(column).and_then(|v| v.as_deref())))
                .collect();
            rendered.push(rendered_values.join(", "));
        }

        Ok(Some(format!(
            "INSERT INTO `{}` ({}) VALUES ({});{}",
            table_name.as_str(),
            columns_text.as_str(),
            rendered.join("), ("),
            trailer
        )))
    }
}

fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") {
        line.split_at(line.len() - 1)
    } else {
        line.split_at(line.len())
    }
}

fn split_values(separator: &fancy_regex::Regex, tuple: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    let mut start = 0;
    for found in separator.find_iter(tuple) {
        let found = found.map_err(|e| ScrubError::Other(format!("Value split failed: {e}")))?;
        values.push(tuple[start..found.start()].trim().to_string());
        start = found.end();
    }
    values.push(tuple[start..].trim().to_string());
    Ok(values)
}

/// Unquotes a dump literal; a bare `NULL` is an absent value
fn parse_value(raw: &str) -> Option<String> {
    if raw == NULL_LITERAL {
        return None;
    }
    let inner = raw.strip_prefix('\'').unwrap_or(raw);
    let inner = inner.strip_suffix('\'').unwrap_or(inner);
    Some(unescape(inner))
}

/// Quotes a value for the dump; absent values become `NULL`
fn render_value(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", escape(value)),
        None => NULL_LITERAL.to_string(),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('\\' | '\''))) => {
                unescaped.push(next);
                chars.next();
            }
            (other, _) => unescaped.push(other),
        }
    }
    unescaped
}

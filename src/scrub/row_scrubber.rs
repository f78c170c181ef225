//! Row scrubber
//!
//! Scrubs the configured columns of one row in dependency order, writing each
//! replacement back before the next column runs so dependent columns see
//! scrubbed values.

use crate::adapters::generator::FakeValueGenerator;
use crate::domain::{Result, RowContext};
use crate::scrub::strategy::FallbackStep;
use crate::scrub::table::TableSpec;
use crate::scrub::validator::ValidatorFactory;

/// What happened to each scrubbed column of a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowScrubReport {
    /// `(column, step)` in processing order; `None` marks an exhausted column
    pub columns: Vec<(String, Option<FallbackStep>)>,
}

impl RowScrubReport {
    /// Columns whose validator rejected every candidate
    pub fn exhausted(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, step)| step.is_none())
            .map(|(name, _)| name.as_str())
    }

    /// Columns that fell back past fresh generation
    pub fn fallbacks(&self) -> usize {
        self.columns
            .iter()
            .filter(|(_, step)| matches!(step, Some(FallbackStep::Mutation | FallbackStep::Mask)))
            .count()
    }
}

/// Scrubs rows of one table
#[derive(Debug, Clone, Copy)]
pub struct RowScrubber<'t> {
    table: &'t TableSpec,
}

impl<'t> RowScrubber<'t> {
    pub fn new(table: &'t TableSpec) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t TableSpec {
        self.table
    }

    /// Scrubs `row` in place
    ///
    /// Columns that are configured but absent from the row are skipped.
    /// Exhausted columns are set to `None`.
    ///
    /// # Errors
    ///
    /// Propagates validator errors. The row may be partially scrubbed when
    /// that happens.
    pub fn scrub(
        &self,
        row: &mut RowContext,
        factory: &mut dyn ValidatorFactory,
        generator: &mut dyn FakeValueGenerator,
    ) -> Result<RowScrubReport> {
        let mut report = RowScrubReport::default();

        for column in self.table.sorted_columns() {
            let Some(original) = row.get(column.name()) else {
                continue;
            };
            let original = original.clone();

            let mut validator = factory.validator_for(column, row);
            let outcome = column.strategy().scrub_with_outcome(
                original.as_deref(),
                row,
                generator,
                validator.as_deref_mut(),
            )?;
            drop(validator);

            let step = outcome.step();
            if step.is_none() {
                tracing::warn!(
                    table = %self.table.name(),
                    column = %column.name(),
                    "Uniqueness exhausted; column set to NULL"
                );
            }

            report.columns.push((column.name().to_string(), step));
            row.insert(column.name().to_string(), outcome.into_value());
        }

        Ok(report)
    }
}

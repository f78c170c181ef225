//! Candidate validators
//!
//! The row scrubber asks a [`ValidatorFactory`] for a validator per column and
//! row. The factory decides whether uniqueness is enforced for that column
//! and how candidates are keyed in the uniqueness filter, which keeps the
//! dump and live paths on the same scrubber with different policies.

use crate::domain::{Result, RowContext};
use crate::scrub::filter::UniquenessFilter;
use crate::scrub::table::ColumnSpec;
use std::collections::HashSet;

/// Predicate over a candidate value
///
/// `Ok(true)` accepts the candidate. Accepting validators backed by a filter
/// record the candidate in the same call.
pub type Validator<'a> = dyn FnMut(Option<&str>) -> Result<bool> + 'a;

/// Builds validators for the row scrubber
pub trait ValidatorFactory {
    /// Validator for `column` in `row`, or `None` to accept the first candidate
    fn validator_for<'a>(
        &'a mut self,
        column: &ColumnSpec,
        row: &RowContext,
    ) -> Option<Box<Validator<'a>>>;
}

/// Enforces nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ValidatorFactory for AcceptAll {
    fn validator_for<'a>(
        &'a mut self,
        _column: &ColumnSpec,
        _row: &RowContext,
    ) -> Option<Box<Validator<'a>>> {
        None
    }
}

/// One filter shared by every column of every table
///
/// Keys are the raw candidate values. Absent candidates are accepted without
/// touching the filter.
#[derive(Debug)]
pub struct GlobalUniqueness<'f> {
    filter: &'f mut UniquenessFilter,
}

impl<'f> GlobalUniqueness<'f> {
    pub fn new(filter: &'f mut UniquenessFilter) -> Self {
        Self { filter }
    }
}

impl ValidatorFactory for GlobalUniqueness<'_> {
    fn validator_for<'a>(
        &'a mut self,
        _column: &ColumnSpec,
        _row: &RowContext,
    ) -> Option<Box<Validator<'a>>> {
        let filter = &mut *self.filter;
        Some(Box::new(move |candidate: Option<&str>| match candidate {
            Some(value) => filter.check_and_insert(value),
            None => Ok(true),
        }))
    }
}

/// A filter scoped to one table's unique columns
///
/// Keys are namespaced as `<column>:<candidate>` so values of different
/// columns never collide. Columns outside `columns`, or every column when
/// there is no filter, accept the first candidate.
#[derive(Debug)]
pub struct ScopedUniqueness<'f> {
    filter: Option<&'f mut UniquenessFilter>,
    columns: &'f HashSet<String>,
}

impl<'f> ScopedUniqueness<'f> {
    pub fn new(filter: Option<&'f mut UniquenessFilter>, columns: &'f HashSet<String>) -> Self {
        Self { filter, columns }
    }
}

impl ValidatorFactory for ScopedUniqueness<'_> {
    fn validator_for<'a>(
        &'a mut self,
        column: &ColumnSpec,
        _row: &RowContext,
    ) -> Option<Box<Validator<'a>>> {
        if !self.columns.contains(column.name()) {
            return None;
        }
        let filter = self.filter.as_deref_mut()?;
        let namespace = column.name().to_string();

        Some(Box::new(move |candidate: Option<&str>| match candidate {
            Some(value) => filter.check_and_insert(&namespaced_key(&namespace, value)),
            None => Ok(true),
        }))
    }
}

/// Filter key for `value` in `column`
pub fn namespaced_key(column: &str, value: &str) -> String {
    format!("{column}:{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::filter::FilterOptions;
    use crate::scrub::table::{ColumnOptions, ScrubKind};

    fn filter() -> UniquenessFilter {
        UniquenessFilter::new(FilterOptions::default().with_size(10_000)).unwrap()
    }

    fn column(name: &str) -> ColumnSpec {
        ColumnSpec::new(name, ScrubKind::Email, ColumnOptions::default())
    }

    #[test]
    fn test_accept_all_has_no_validator() {
        let mut factory = AcceptAll;
        assert!(factory
            .validator_for(&column("email"), &RowContext::new())
            .is_none());
    }

    #[test]
    fn test_global_rejects_repeats_across_columns() {
        let mut filter = filter();
        let mut factory = GlobalUniqueness::new(&mut filter);
        let row = RowContext::new();

        {
            let mut validator = factory.validator_for(&column("email"), &row).unwrap();
            assert!(validator(Some("a@x.com")).unwrap());
            assert!(!validator(Some("a@x.com")).unwrap());
        }
        let mut other = factory.validator_for(&column("backup_email"), &row).unwrap();
        assert!(!other(Some("a@x.com")).unwrap());
        assert!(other(None).unwrap());
        drop(other);

        assert!(filter.contains("a@x.com"));
    }

    #[test]
    fn test_scoped_namespaces_keys() {
        let mut filter = filter();
        let columns: HashSet<String> = ["email", "login"].iter().map(|s| s.to_string()).collect();
        let row = RowContext::new();
        let mut factory = ScopedUniqueness::new(Some(&mut filter), &columns);

        {
            let mut validator = factory.validator_for(&column("email"), &row).unwrap();
            assert!(validator(Some("same")).unwrap());
            assert!(!validator(Some("same")).unwrap());
        }
        let mut login = factory.validator_for(&column("login"), &row).unwrap();
        assert!(login(Some("same")).unwrap());
        drop(login);

        assert!(filter.contains("email:same"));
        assert!(filter.contains("login:same"));
        assert!(!filter.contains("same"));
    }

    #[test]
    fn test_scoped_skips_ineligible_columns() {
        let mut filter = filter();
        let columns: HashSet<String> = ["email".to_string()].into_iter().collect();
        let mut factory = ScopedUniqueness::new(Some(&mut filter), &columns);
        assert!(factory
            .validator_for(&column("nickname"), &RowContext::new())
            .is_none());
    }

    #[test]
    fn test_scoped_without_filter_accepts() {
        let columns: HashSet<String> = ["email".to_string()].into_iter().collect();
        let mut factory = ScopedUniqueness::new(None, &columns);
        assert!(factory
            .validator_for(&column("email"), &RowContext::new())
            .is_none());
    }
}

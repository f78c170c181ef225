//! Scrub strategies
//!
//! A strategy produces the replacement value for one column. Every strategy
//! runs the same fallback chain and stops at the first candidate the
//! validator accepts:
//!
//! 1. **Fresh**: a plausible unrelated value from the fake-value generator
//! 2. **Mutation**: the original value with `_` and a four-digit number appended
//! 3. **Mask**: the original value with every interior character replaced by `*`
//!
//! Without a validator the fresh candidate always wins. When the validator
//! rejects all three candidates the strategy yields `None` and the caller
//! decides how to report the exhausted column.
//!
//! The variants only differ in how they generate fresh values; Email also
//! masks just the local part of an address.

pub mod email;
pub mod name;
pub mod text;

pub use email::EmailStrategy;
pub use name::{NameKind, NameStrategy};
pub use text::{TextKind, TextStrategy};

use crate::adapters::generator::FakeValueGenerator;
use crate::domain::{Result, RowContext};
use crate::scrub::table::{ColumnOptions, ScrubKind};
use crate::scrub::validator::Validator;
use serde::Serialize;
use std::fmt;

/// Bounds of the number appended by the mutation step
const MUTATION_SUFFIX_MIN: u32 = 1000;
const MUTATION_SUFFIX_MAX: u32 = 9999;

/// Step of the fallback chain that produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStep {
    Fresh,
    Mutation,
    Mask,
}

impl fmt::Display for FallbackStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FallbackStep::Fresh => "fresh",
            FallbackStep::Mutation => "mutation",
            FallbackStep::Mask => "mask",
        };
        f.write_str(label)
    }
}

/// Result of running the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrubOutcome {
    /// A candidate passed the validator
    Accepted {
        step: FallbackStep,
        value: Option<String>,
    },
    /// Every candidate was rejected
    Exhausted,
}

impl ScrubOutcome {
    /// Replacement value, `None` when exhausted
    pub fn into_value(self) -> Option<String> {
        match self {
            ScrubOutcome::Accepted { value, .. } => value,
            ScrubOutcome::Exhausted => None,
        }
    }

    /// Step that produced the value, `None` when exhausted
    pub fn step(&self) -> Option<FallbackStep> {
        match self {
            ScrubOutcome::Accepted { step, .. } => Some(*step),
            ScrubOutcome::Exhausted => None,
        }
    }
}

/// Replacement policy for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrubStrategy {
    Email(EmailStrategy),
    Name(NameStrategy),
    Text(TextStrategy),
    /// Random words for columns without a dedicated strategy
    Generic,
}

impl ScrubStrategy {
    /// Picks the strategy for a configured column
    pub fn for_column(kind: &ScrubKind, options: &ColumnOptions) -> Self {
        let sub_kind = options.sub_kind.as_deref();
        match kind {
            ScrubKind::Email => ScrubStrategy::Email(EmailStrategy::from_options(options)),
            ScrubKind::Name => ScrubStrategy::Name(NameStrategy::new(NameKind::parse(sub_kind))),
            ScrubKind::FirstName => ScrubStrategy::Name(NameStrategy::new(NameKind::First)),
            ScrubKind::LastName => ScrubStrategy::Name(NameStrategy::new(NameKind::Last)),
            ScrubKind::Username => ScrubStrategy::Text(TextStrategy::new(TextKind::Username)),
            ScrubKind::Text => ScrubStrategy::Text(TextStrategy::new(TextKind::parse(sub_kind))),
            ScrubKind::Generic(_) => ScrubStrategy::Generic,
        }
    }

    /// Produces the replacement for `original`
    ///
    /// Returns `Ok(None)` both for an accepted absent value (masking a `NULL`)
    /// and for exhaustion. Use [`ScrubStrategy::scrub_with_outcome`] to tell
    /// them apart.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by the validator.
    pub fn scrub(
        &self,
        original: Option<&str>,
        row: &RowContext,
        generator: &mut dyn FakeValueGenerator,
        validator: Option<&mut Validator<'_>>,
    ) -> Result<Option<String>> {
        self.scrub_with_outcome(original, row, generator, validator)
            .map(ScrubOutcome::into_value)
    }

    /// Runs the fallback chain and reports which step won
    pub fn scrub_with_outcome(
        &self,
        original: Option<&str>,
        row: &RowContext,
        generator: &mut dyn FakeValueGenerator,
        mut validator: Option<&mut Validator<'_>>,
    ) -> Result<ScrubOutcome> {
        let fresh = Some(self.generate_fresh(original, row, generator));
        if accepts(&mut validator, fresh.as_deref())? {
            return Ok(ScrubOutcome::Accepted {
                step: FallbackStep::Fresh,
                value: fresh,
            });
        }

        let mutated = Some(mutate_original(original, generator));
        if accepts(&mut validator, mutated.as_deref())? {
            return Ok(ScrubOutcome::Accepted {
                step: FallbackStep::Mutation,
                value: mutated,
            });
        }

        let masked = self.mask_original(original);
        if accepts(&mut validator, masked.as_deref())? {
            return Ok(ScrubOutcome::Accepted {
                step: FallbackStep::Mask,
                value: masked,
            });
        }

        Ok(ScrubOutcome::Exhausted)
    }

    /// Step 1 of the chain
    pub fn generate_fresh(
        &self,
        original: Option<&str>,
        row: &RowContext,
        generator: &mut dyn FakeValueGenerator,
    ) -> String {
        match self {
            ScrubStrategy::Email(strategy) => strategy.generate_fresh(original, row, generator),
            ScrubStrategy::Name(strategy) => strategy.generate_fresh(generator),
            ScrubStrategy::Text(strategy) => strategy.generate_fresh(generator),
            ScrubStrategy::Generic => generator.random_word(),
        }
    }

    /// Step 3 of the chain
    pub fn mask_original(&self, original: Option<&str>) -> Option<String> {
        match self {
            ScrubStrategy::Email(strategy) => strategy.mask_original(original),
            _ => mask_value(original),
        }
    }
}

/// Step 2 of the chain
///
/// An absent original mutates to just the suffix, e.g. `_4821`.
pub fn mutate_original(original: Option<&str>, generator: &mut dyn FakeValueGenerator) -> String {
    let suffix = generator.random_int(MUTATION_SUFFIX_MIN..=MUTATION_SUFFIX_MAX);
    format!("{}_{}", original.unwrap_or(""), suffix)
}

/// Keeps the first and last character and stars the rest
///
/// Values shorter than two characters are returned unchanged.
///
/// ```
/// use scrub::scrub::strategy::mask_value;
///
/// assert_eq!(mask_value(Some("secret")), Some("s****t".to_string()));
/// assert_eq!(mask_value(Some("x")), Some("x".to_string()));
/// assert_eq!(mask_value(None), None);
/// ```
pub fn mask_value(value: Option<&str>) -> Option<String> {
    let value = value?;
    let count = value.chars().count();
    if count < 2 {
        return Some(value.to_string());
    }

    let mut chars = value.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;

    let mut masked = String::with_capacity(value.len());
    masked.push(first);
    masked.extend(std::iter::repeat('*').take(count - 2));
    masked.push(last);
    Some(masked)
}

fn accepts(validator: &mut Option<&mut Validator<'_>>, candidate: Option<&str>) -> Result<bool> {
    match validator.as_deref_mut() {
        Some(validator) => validator(candidate),
        None => Ok(true),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CountingGenerator;
    use super::*;
    use crate::domain::row::row_from_pairs;
    use regex::Regex;

    fn generic() -> ScrubStrategy {
        ScrubStrategy::Generic
    }

    fn reject_first(n: usize) -> impl FnMut(Option<&str>) -> Result<bool> {
        let mut seen = 0;
        move |_| {
            seen += 1;
            Ok(seen > n)
        }
    }

    #[test]
    fn test_no_validator_returns_fresh() {
        let mut gen = CountingGenerator::default();
        let outcome = generic()
            .scrub_with_outcome(Some("secret"), &RowContext::new(), &mut gen, None)
            .unwrap();
        assert_eq!(
            outcome,
            ScrubOutcome::Accepted {
                step: FallbackStep::Fresh,
                value: Some("word1".to_string()),
            }
        );
    }

    #[test]
    fn test_accept_all_returns_fresh() {
        let mut gen = CountingGenerator::default();
        let mut accept = |_: Option<&str>| -> Result<bool> { Ok(true) };
        let value = generic()
            .scrub(Some("secret"), &RowContext::new(), &mut gen, Some(&mut accept))
            .unwrap();
        assert_eq!(value.as_deref(), Some("word1"));
    }

    #[test]
    fn test_rejected_fresh_falls_back_to_mutation() {
        let mut gen = crate::adapters::generator::FakerGenerator::seeded(5);
        let mut validator = reject_first(1);
        let value = generic()
            .scrub(Some("secret"), &RowContext::new(), &mut gen, Some(&mut validator))
            .unwrap()
            .unwrap();
        let pattern = Regex::new(r"^secret_\d{4}$").unwrap();
        assert!(pattern.is_match(&value), "got {value}");
    }

    #[test]
    fn test_rejected_fresh_and_mutation_falls_back_to_mask() {
        let mut gen = CountingGenerator::default();
        let mut validator = reject_first(2);
        let outcome = generic()
            .scrub_with_outcome(Some("secret"), &RowContext::new(), &mut gen, Some(&mut validator))
            .unwrap();
        assert_eq!(outcome.step(), Some(FallbackStep::Mask));
        assert_eq!(outcome.into_value().as_deref(), Some("s****t"));
    }

    #[test]
    fn test_mask_keeps_short_values() {
        let mut gen = CountingGenerator::default();
        let mut validator = reject_first(2);
        let value = generic()
            .scrub(Some("a"), &RowContext::new(), &mut gen, Some(&mut validator))
            .unwrap();
        assert_eq!(value.as_deref(), Some("a"));
    }

    #[test]
    fn test_mask_of_absent_value_is_absent() {
        let mut gen = CountingGenerator::default();
        let mut validator = reject_first(2);
        let outcome = generic()
            .scrub_with_outcome(None, &RowContext::new(), &mut gen, Some(&mut validator))
            .unwrap();
        assert_eq!(
            outcome,
            ScrubOutcome::Accepted {
                step: FallbackStep::Mask,
                value: None,
            }
        );
    }

    #[test]
    fn test_all_rejected_is_exhausted() {
        let mut gen = CountingGenerator::default();
        let mut reject = |_: Option<&str>| -> Result<bool> { Ok(false) };
        let outcome = generic()
            .scrub_with_outcome(Some("secret"), &RowContext::new(), &mut gen, Some(&mut reject))
            .unwrap();
        assert_eq!(outcome, ScrubOutcome::Exhausted);
        assert_eq!(outcome.step(), None);
        assert_eq!(outcome.into_value(), None);
    }

    #[test]
    fn test_validator_error_propagates() {
        let mut gen = CountingGenerator::default();
        let mut failing = |_: Option<&str>| -> Result<bool> {
            Err(crate::domain::ScrubError::FilterOverflow("full".to_string()))
        };
        let err = generic()
            .scrub(Some("x"), &RowContext::new(), &mut gen, Some(&mut failing))
            .unwrap_err();
        assert!(matches!(err, crate::domain::ScrubError::FilterOverflow(_)));
    }

    #[test]
    fn test_validator_sees_candidates_in_order() {
        let mut gen = CountingGenerator::default();
        let mut seen = Vec::new();
        let mut record = |candidate: Option<&str>| -> Result<bool> {
            seen.push(candidate.map(str::to_string));
            Ok(false)
        };
        generic()
            .scrub(Some("abc"), &RowContext::new(), &mut gen, Some(&mut record))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                Some("word1".to_string()),
                Some("abc_1234".to_string()),
                Some("a*c".to_string()),
            ]
        );
    }

    #[test]
    fn test_mutation_of_absent_original() {
        let mut gen = CountingGenerator::default();
        assert_eq!(mutate_original(None, &mut gen), "_1234");
    }

    #[test]
    fn test_mask_value_counts_characters() {
        assert_eq!(mask_value(Some("ab")), Some("ab".to_string()));
        assert_eq!(mask_value(Some("abc")), Some("a*c".to_string()));
        assert_eq!(mask_value(Some("Zoë")), Some("Z*ë".to_string()));
        assert_eq!(mask_value(Some("")), Some(String::new()));
    }

    #[test]
    fn test_for_column_mapping() {
        let options = ColumnOptions::default();
        assert!(matches!(
            ScrubStrategy::for_column(&ScrubKind::Email, &options),
            ScrubStrategy::Email(_)
        ));
        assert_eq!(
            ScrubStrategy::for_column(&ScrubKind::FirstName, &options),
            ScrubStrategy::Name(NameStrategy::new(NameKind::First))
        );
        assert_eq!(
            ScrubStrategy::for_column(&ScrubKind::Username, &options),
            ScrubStrategy::Text(TextStrategy::new(TextKind::Username))
        );
        assert_eq!(
            ScrubStrategy::for_column(&ScrubKind::Generic("phone".to_string()), &options),
            ScrubStrategy::Generic
        );

        let typed = ColumnOptions {
            sub_kind: Some("last_name".to_string()),
            ..ColumnOptions::default()
        };
        assert_eq!(
            ScrubStrategy::for_column(&ScrubKind::Name, &typed),
            ScrubStrategy::Name(NameStrategy::new(NameKind::Last))
        );
    }

    #[test]
    fn test_row_is_read_not_written() {
        let row = row_from_pairs([("fullname", Some("Ada Lovelace"))]);
        let mut gen = CountingGenerator::default();
        generic().scrub(Some("x"), &row, &mut gen, None).unwrap();
        assert_eq!(row.len(), 1);
    }
}

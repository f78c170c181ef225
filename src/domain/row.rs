//! Row context
//!
//! A [`RowContext`] holds one database row as column name to text value.
//! Values are `None` for SQL `NULL`. The row scrubber mutates it in place so
//! columns processed later observe already-scrubbed values of earlier ones.

use std::collections::HashMap;

/// Current values of one row, keyed by column name
pub type RowContext = HashMap<String, Option<String>>;

/// Builds a row from `(column, value)` pairs
///
/// Mostly useful in tests and examples.
///
/// ```
/// use scrub::domain::row::row_from_pairs;
///
/// let row = row_from_pairs([("id", Some("1")), ("email", None)]);
/// assert_eq!(row.get("id"), Some(&Some("1".to_string())));
/// assert_eq!(row.get("email"), Some(&None));
/// ```
pub fn row_from_pairs<'a, I>(pairs: I) -> RowContext
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}

/// Returns the current value of `column` when it is present and not `NULL`
pub fn value_of<'r>(row: &'r RowContext, column: &str) -> Option<&'r str> {
    row.get(column).and_then(|v| v.as_deref())
}

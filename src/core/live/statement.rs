//! UPDATE statement construction

use crate::adapters::database::DatabaseClient;
use crate::domain::RowContext;
use crate::scrub::table::TableSpec;
use std::collections::BTreeMap;

/// Configured columns whose scrubbed value differs from the original, by name
pub fn changed_columns<'r>(
    table: &TableSpec,
    original: &RowContext,
    scrubbed: &'r RowContext,
) -> BTreeMap<String, Option<&'r str>> {
    table
        .columns()
        .iter()
        .filter_map(|column| {
            let before = original.get(column.name())?;
            let after = scrubbed.get(column.name())?;
            (before != after).then(|| (column.name().to_string(), after.as_deref()))
        })
        .collect()
}

/// `UPDATE <table> SET <col> = <val>, ... WHERE <pk> = '<pk value>'`
///
/// Identifiers and literals are rendered by `client`. Columns appear in name
/// order.
pub fn update_statement(
    client: &dyn DatabaseClient,
    table: &str,
    primary_key: &str,
    key_value: &str,
    changes: &BTreeMap<String, Option<&str>>,
) -> String {
    let assignments = changes
        .iter()
        .map(|(column, value)| {
            format!(
                "{} = {}",
                client.quote_identifier(column),
                client.literal(*value)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        client.quote_identifier(table),
        assignments,
        client.quote_identifier(primary_key),
        client.literal(Some(key_value))
    )
}

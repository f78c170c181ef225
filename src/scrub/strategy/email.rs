//! Email strategy

use super::mask_value;
use crate::adapters::generator::FakeValueGenerator;
use crate::domain::row::{value_of, RowContext};
use crate::scrub::table::ColumnOptions;

/// Replaces email addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailStrategy {
    /// Domain used when the original domain is not preserved
    pub domain: Option<String>,
    /// Keep the domain of the original address
    pub preserve_domain: bool,
    /// Column whose current value seeds the local part
    pub name_column: Option<String>,
}

impl EmailStrategy {
    pub fn from_options(options: &ColumnOptions) -> Self {
        Self {
            domain: options.domain.clone(),
            preserve_domain: options.preserve_domain,
            name_column: options.name_column.clone(),
        }
    }

    /// Generates an address
    ///
    /// The domain is, in order of preference: the original's domain when
    /// `preserve_domain` is set and the original has a non-empty part after
    /// its last `@`, the configured domain, then the generator's default. The local part is derived from
    /// the `name_column` value as it currently stands in `row`.
    pub fn generate_fresh(
        &self,
        original: Option<&str>,
        row: &RowContext,
        generator: &mut dyn FakeValueGenerator,
    ) -> String {
        let preserved = original
            .filter(|_| self.preserve_domain)
            .and_then(|value| value.rsplit_once('@'))
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty());
        let domain = preserved.or(self.domain.as_deref());

        let hint = self
            .name_column
            .as_deref()
            .and_then(|column| value_of(row, column));

        generator.random_email(domain, hint)
    }

    /// Masks the local part and keeps the domain
    ///
    /// Values without `@` are returned unchanged.
    pub fn mask_original(&self, original: Option<&str>) -> Option<String> {
        let value = original?;
        match value.split_once('@') {
            Some((local, domain)) => {
                let local = mask_value(Some(local)).unwrap_or_default();
                Some(format!("{local}@{domain}"))
            }
            None => Some(value.to_string()),
        }
    }
}

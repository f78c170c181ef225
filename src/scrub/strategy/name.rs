//! Personal name strategy

use crate::adapters::generator::FakeValueGenerator;

/// Which part of a name a column holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameKind {
    First,
    Last,
    #[default]
    Full,
}

impl NameKind {
    /// Parses the `type` option; anything unrecognized is a full name
    pub fn parse(sub_kind: Option<&str>) -> Self {
        match sub_kind.map(str::trim) {
            Some("first_name") => NameKind::First,
            Some("last_name") => NameKind::Last,
            _ => NameKind::Full,
        }
    }
}

/// Replaces personal names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameStrategy {
    pub kind: NameKind,
}

impl NameStrategy {
    pub fn new(kind: NameKind) -> Self {
        Self { kind }
    }

    pub fn generate_fresh(&self, generator: &mut dyn FakeValueGenerator) -> String {
        match self.kind {
            NameKind::First => generator.random_first_name(),
            NameKind::Last => generator.random_last_name(),
            NameKind::Full => generator.random_full_name(),
        }
    }
}

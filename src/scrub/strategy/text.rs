//! Free-text strategy

use crate::adapters::generator::FakeValueGenerator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextKind {
    Username,
    #[default]
    Word,
}

impl TextKind {
    /// `username` selects usernames; anything else is a word
    pub fn parse(sub_kind: Option<&str>) -> Self {
        match sub_kind.map(str::trim) {
            Some("username") => TextKind::Username,
            _ => TextKind::Word,
        }
    }
}

/// Replaces short text tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStrategy {
    pub kind: TextKind,
}

impl TextStrategy {
    pub fn new(kind: TextKind) -> Self {
        Self { kind }
    }

    pub fn generate_fresh(&self, generator: &mut dyn FakeValueGenerator) -> String {
        match self.kind {
            TextKind::Username => generator.random_username(),
            TextKind::Word => generator.random_word(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::strategy::testing::CountingGenerator;

    #[test]
    fn test_username_and_word() {
        let mut gen = CountingGenerator::default();
        assert_eq!(TextStrategy::new(TextKind::Username).generate_fresh(&mut gen), "login1");
        assert_eq!(TextStrategy::default().generate_fresh(&mut gen), "word2");
    }

    #[test]
    fn test_parse() {
        assert_eq!(TextKind::parse(Some("username")), TextKind::Username);
        assert_eq!(TextKind::parse(Some("bio")), TextKind::Word);
        assert_eq!(TextKind::parse(None), TextKind::Word);
    }
}

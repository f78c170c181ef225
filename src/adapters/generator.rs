//! Fake value generation
//!
//! Scrub strategies never talk to the `fake` crate directly. They go through
//! [`FakeValueGenerator`], so tests can swap in scripted generators and the
//! production generator can be seeded for reproducible output.

use fake::faker::internet::en::Username;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Domains used when a strategy has no domain to preserve or override
const DEFAULT_EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Separators placed between name words in a generated local part
const LOCAL_PART_SEPARATORS: &[&str] = &[".", "_"];

/// Source of plausible replacement values
pub trait FakeValueGenerator {
    /// A given name
    fn random_first_name(&mut self) -> String;

    /// A family name
    fn random_last_name(&mut self) -> String;

    /// A full personal name
    fn random_full_name(&mut self) -> String;

    /// An email address
    ///
    /// `domain` replaces the default domain. When `local_part_hint` is given
    /// (typically a person's name), the local part is derived from it.
    fn random_email(&mut self, domain: Option<&str>, local_part_hint: Option<&str>) -> String;

    /// A login-style username
    fn random_username(&mut self) -> String;

    /// A single lorem word
    fn random_word(&mut self) -> String;

    /// A uniformly drawn integer from `range`
    fn random_int(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// [`FakeValueGenerator`] backed by the `fake` crate
#[derive(Debug, Clone)]
pub struct FakerGenerator {
    rng: StdRng,
}

impl FakerGenerator {
    /// Creates a generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is present, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    fn local_part_from(&mut self, hint: &str) -> Option<String> {
        let words: Vec<String> = hint
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return None;
        }

        let separator = LOCAL_PART_SEPARATORS.choose(&mut self.rng).copied().unwrap_or(".");
        Some(words.join(separator))
    }
}

impl Default for FakerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeValueGenerator for FakerGenerator {
    fn random_first_name(&mut self) -> String {
        FirstName().fake_with_rng(&mut self.rng)
    }

    fn random_last_name(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }

    fn random_full_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    fn random_email(&mut self, domain: Option<&str>, local_part_hint: Option<&str>) -> String {
        let local = match local_part_hint.and_then(|hint| self.local_part_from(hint)) {
            Some(local) => local,
            None => sanitize_username(&self.random_username()),
        };

        let domain = match domain {
            Some(domain) => domain.to_string(),
            None => DEFAULT_EMAIL_DOMAINS
                .choose(&mut self.rng)
                .copied()
                .unwrap_or("example.com")
                .to_string(),
        };

        format!("{local}@{domain}")
    }

    fn random_username(&mut self) -> String {
        Username().fake_with_rng(&mut self.rng)
    }

    fn random_word(&mut self) -> String {
        Word().fake_with_rng(&mut self.rng)
    }

    fn random_int(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

fn sanitize_username(username: &str) -> String {
    let cleaned: String = username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

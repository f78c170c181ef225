//! Uniqueness filter
//!
//! A counting Bloom filter used to keep replacement values from colliding in
//! columns that must stay unique. Membership answers may be false positives
//! but never false negatives: a spurious "already seen" only pushes the
//! scrubber to its next fallback candidate.
//!
//! Each slot is a small counter `bucket_width` bits wide. Inserting increments
//! the `hash_count` slots selected by double hashing over a SHA-256 digest of
//! the seeded key. A saturated slot stays saturated, or fails the insert when
//! `raise_on_overflow` is set.

use crate::domain::{Result, ScrubError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sizing and hashing parameters of a [`UniquenessFilter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Number of counter slots
    #[serde(default = "default_size")]
    pub size: usize,

    /// Slots touched per key
    #[serde(default = "default_hash_count")]
    pub hash_count: u32,

    /// Seed mixed into every hash
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Bits per counter slot (1-8)
    #[serde(default = "default_bucket_width")]
    pub bucket_width: u8,

    /// Fail inserts that would overflow a saturated slot
    #[serde(default)]
    pub raise_on_overflow: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            size: default_size(),
            hash_count: default_hash_count(),
            seed: default_seed(),
            bucket_width: default_bucket_width(),
            raise_on_overflow: false,
        }
    }
}

impl FilterOptions {
    /// Validates the parameters
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.size == 0 {
            return Err("uniqueness_filter.size must be > 0".to_string());
        }
        if self.hash_count == 0 {
            return Err("uniqueness_filter.hash_count must be > 0".to_string());
        }
        if !(1..=8).contains(&self.bucket_width) {
            return Err(format!(
                "uniqueness_filter.bucket_width must be between 1 and 8, got {}",
                self.bucket_width
            ));
        }
        Ok(())
    }

    /// Returns a copy with a different slot count
    pub fn with_size(&self, size: usize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

fn default_size() -> usize {
    1_000_000
}

fn default_hash_count() -> u32 {
    5
}

fn default_seed() -> u64 {
    1
}

fn default_bucket_width() -> u8 {
    8
}

/// Probabilistic set of already-emitted replacement values
#[derive(Debug, Clone)]
pub struct UniquenessFilter {
    counters: Vec<u8>,
    max_count: u8,
    options: FilterOptions,
    inserted: usize,
}

impl UniquenessFilter {
    /// Creates an empty filter
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid.
    pub fn new(options: FilterOptions) -> Result<Self> {
        options.validate().map_err(ScrubError::Configuration)?;

        let max_count = u8::MAX >> (8 - options.bucket_width);

        Ok(Self {
            counters: vec![0; options.size],
            max_count,
            options,
            inserted: 0,
        })
    }

    /// Returns `true` if `key` may have been inserted before
    pub fn contains(&self, key: &str) -> bool {
        self.slots(key).all(|slot| self.counters[slot] > 0)
    }

    /// Records `key`
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::FilterOverflow`] when a slot is already saturated
    /// and `raise_on_overflow` is set. No slot is modified in that case.
    pub fn insert(&mut self, key: &str) -> Result<()> {
        let slots: Vec<usize> = self.slots(key).collect();

        if self.options.raise_on_overflow
            && slots.iter().any(|&slot| self.counters[slot] >= self.max_count)
        {
            return Err(ScrubError::FilterOverflow(format!(
                "counter saturated at {} after {} inserts",
                self.max_count, self.inserted
            )));
        }

        for slot in slots {
            let counter = &mut self.counters[slot];
            if *counter < self.max_count {
                *counter += 1;
            }
        }
        self.inserted += 1;

        Ok(())
    }

    /// Accepts `key` if it has not been seen, recording it in the same step
    ///
    /// Returns `Ok(false)` for a (possibly false-positive) duplicate.
    pub fn check_and_insert(&mut self, key: &str) -> Result<bool> {
        if self.contains(key) {
            return Ok(false);
        }
        self.insert(key)?;
        Ok(true)
    }

    /// Number of successful inserts
    pub fn len(&self) -> usize {
        self.inserted
    }

    /// Returns `true` if nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Parameters the filter was built with
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn slots(&self, key: &str) -> impl Iterator<Item = usize> {
        let mut hasher = Sha256::new();
        hasher.update(self.options.seed.to_le_bytes());
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();

        let mut first = [0u8; 8];
        let mut second = [0u8; 8];
        first.copy_from_slice(&digest[..8]);
        second.copy_from_slice(&digest[8..16]);

        let h1 = u64::from_le_bytes(first);
        // Odd step so probes never collapse onto one slot
        let h2 = u64::from_le_bytes(second) | 1;
        let size = self.options.size as u64;

        (0..u64::from(self.options.hash_count))
            .map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % size) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(raise_on_overflow: bool, bucket_width: u8) -> UniquenessFilter {
        UniquenessFilter::new(FilterOptions {
            size: 1024,
            hash_count: 3,
            seed: 7,
            bucket_width,
            raise_on_overflow,
        })
        .unwrap()
    }

    #[test]
    fn test_insert_then_contains() {
        let mut filter = small(false, 8);
        assert!(!filter.contains("alice@example.com"));
        filter.insert("alice@example.com").unwrap();
        assert!(filter.contains("alice@example.com"));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_check_and_insert_rejects_second_time() {
        let mut filter = small(false, 8);
        assert!(filter.check_and_insert("x").unwrap());
        assert!(!filter.check_and_insert("x").unwrap());
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_no_false_negatives_over_many_keys() {
        let mut filter = UniquenessFilter::new(FilterOptions::default()).unwrap();
        let keys: Vec<String> = (0..2_000).map(|i| format!("user{i}@example.org")).collect();
        for key in &keys {
            filter.insert(key).unwrap();
        }
        assert!(keys.iter().all(|k| filter.contains(k)));
    }

    #[test]
    fn test_seed_changes_slots() {
        let a = small(false, 8);
        let mut b_options = a.options().clone();
        b_options.seed = 8;
        let b = UniquenessFilter::new(b_options).unwrap();
        let sa: Vec<usize> = a.slots("key").collect();
        let sb: Vec<usize> = b.slots("key").collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn test_overflow_saturates_without_raise() {
        let mut filter = small(false, 1);
        filter.insert("k").unwrap();
        filter.insert("k").unwrap();
        assert!(filter.contains("k"));
    }

    #[test]
    fn test_overflow_raises_when_configured() {
        let mut filter = small(true, 1);
        filter.insert("k").unwrap();
        let err = filter.insert("k").unwrap_err();
        assert!(matches!(err, ScrubError::FilterOverflow(_)));
    }

    #[test]
    fn test_invalid_options() {
        let mut options = FilterOptions::default();
        options.bucket_width = 9;
        assert!(UniquenessFilter::new(options.clone()).is_err());
        options.bucket_width = 4;
        options.size = 0;
        assert!(UniquenessFilter::new(options).is_err());
    }

    #[test]
    fn test_with_size_keeps_other_options() {
        let options = FilterOptions::default().with_size(42);
        assert_eq!(options.size, 42);
        assert_eq!(options.hash_count, 5);
        assert_eq!(options.bucket_width, 8);
    }
}

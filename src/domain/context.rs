//! Error context extension trait
//!
//! Adds `.context()` and `.with_context()` to any `Result` whose error converts
//! into [`ScrubError`]. Unlike `anyhow::Context`, the error keeps its variant,
//! so a duplicate-key error with context is still a duplicate-key error and
//! the live processor's retry classification keeps working.
//!
//! # Examples
//!
//! ```rust
//! use scrub::domain::Result;
//! use scrub::domain::context::ResultExt;
//!
//! fn read_dump(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read dump file: {}", path))
//! }
//! ```

use crate::domain::errors::ScrubError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Prefixes the error message with `context`
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    /// Like [`ResultExt::context`], computing the context only on error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ScrubError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(err: ScrubError, context: &dyn Display) -> ScrubError {
    let wrap = |msg: String| format!("{context}: {msg}");
    match err {
        ScrubError::Configuration(msg) => ScrubError::Configuration(wrap(msg)),
        ScrubError::Database(msg) => ScrubError::Database(wrap(msg)),
        ScrubError::DuplicateKey(msg) => ScrubError::DuplicateKey(wrap(msg)),
        ScrubError::Connection(msg) => ScrubError::Connection(wrap(msg)),
        ScrubError::FilterOverflow(msg) => ScrubError::FilterOverflow(wrap(msg)),
        ScrubError::Serialization(msg) => ScrubError::Serialization(wrap(msg)),
        ScrubError::Io(msg) => ScrubError::Io(wrap(msg)),
        ScrubError::Other(msg) => ScrubError::Other(wrap(msg)),
        // Structured variant; its message already names table and column
        cycle @ ScrubError::CircularDependency { .. } => cycle,
    }
}

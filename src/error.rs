//! Error types for the evictkit library.
//!
//! - [`ConfigError`]: returned by fallible `try_*` constructors when a cache
//!   parameter is invalid (e.g. a zero LFU aging threshold).
//! - [`InvariantError`]: returned by `check_invariants` methods when an
//!   engine's internal structure is inconsistent. These checks exist for
//!   tests and debugging; library operations never produce one.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when a cache constructor parameter is invalid.
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
///
/// let err = LfuCache::<u64, u64>::try_with_max_avg(8, 0).unwrap_err();
/// assert!(err.to_string().contains("max_avg"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an engine's internal invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError {
    message: String,
}

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("max_avg must be > 0");
        assert_eq!(err.to_string(), "max_avg must be > 0");
        assert_eq!(err.message(), "max_avg must be > 0");
    }

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index and list disagree on length");
        assert_eq!(err.to_string(), "index and list disagree on length");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }

    #[test]
    fn errors_clone_and_compare() {
        let a = ConfigError::new("x");
        assert_eq!(a.clone(), a);
        let b = InvariantError::new("y");
        assert_eq!(b.clone(), b);
    }
}

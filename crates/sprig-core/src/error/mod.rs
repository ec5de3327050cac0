//! Error types and result aliases for sprig operations.
//!
//! Every error in the resolution taxonomy is terminal to a run: the first one
//! encountered aborts resolution and is surfaced verbatim to the caller with
//! the offending package name(s) and version strings.

use thiserror::Error;

/// Unified error type for all sprig operations.
///
/// `Clone` is required so registry failures can be memoized in the
/// single-flight fetch cache and replayed to later callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SprigError {
    // Registry errors
    #[error("registry request for '{package}' failed: {message}")]
    Registry { package: String, message: String },

    // Selection errors
    #[error("invalid version selector '{selector}' for package '{package}'")]
    InvalidSelector { package: String, selector: String },

    #[error("no published version of '{package}' satisfies '{selector}'")]
    NoSatisfyingVersion { package: String, selector: String },

    // Merge errors
    #[error("refusing to downgrade '{package}' from '{current}' to '{proposed}'")]
    Downgrade {
        package: String,
        current: String,
        proposed: String,
    },

    #[error("conflicting constraints on '{package}': '{existing}' does not intersect '{proposed}'")]
    Conflict {
        package: String,
        existing: String,
        proposed: String,
    },
}

/// Result type alias for sprig operations
pub type SprigResult<T> = Result<T, SprigError>;

impl SprigError {
    /// Create a registry error from any error type
    pub fn registry<E: std::fmt::Display>(package: impl Into<String>, source: E) -> Self {
        Self::Registry {
            package: package.into(),
            message: source.to_string(),
        }
    }

    /// The package name this error is about
    pub fn package(&self) -> &str {
        match self {
            SprigError::Registry { package, .. }
            | SprigError::InvalidSelector { package, .. }
            | SprigError::NoSatisfyingVersion { package, .. }
            | SprigError::Downgrade { package, .. }
            | SprigError::Conflict { package, .. } => package,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SprigError::Registry { .. } => {
                Some("Check your internet connection and the registry URL, then try again")
            }
            SprigError::InvalidSelector { .. } => {
                Some("Use a dist-tag, an exact version, a semver range, or '*'")
            }
            SprigError::Conflict { .. } => {
                Some("Loosen the anchor selector or update the conflicting packages together")
            }
            _ => None,
        }
    }
}

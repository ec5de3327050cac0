//! npm registry client for sprig.
//!
//! This crate fetches packuments (package metadata documents) over HTTPS and
//! memoizes them in a single-flight cache: concurrent requests for the same
//! package collapse onto one network call and all observers share its
//! outcome, success or failure.

pub mod api;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{Packument, VersionManifest};
pub use cache::PackumentCache;
pub use client::RegistryClient;

use sprig_core::error::SprigError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, SprigError>;

//! Single-flight packument cache.
//!
//! Entries are keyed by resolved request URL and hold a `OnceCell` that is
//! initialized by exactly one fetch: concurrent callers requesting the same
//! package during the same run await the in-flight fetch instead of issuing
//! their own, and every later caller observes the memoized outcome. Failures
//! are cached alongside successes so a broken package fails fast within the
//! cache's lifetime instead of hammering the network.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::api::Packument;
use sprig_core::error::SprigError;

/// Memoized result of one packument fetch
pub type FetchOutcome = Result<Arc<Packument>, SprigError>;

/// In-memory single-flight cache, shared across the branches of a resolution
/// run (and optionally across runs within one process).
///
/// The cache is always constructor-injected into `RegistryClient`, never a
/// module-level singleton, so tests can isolate a cache per run.
#[derive(Debug, Default)]
pub struct PackumentCache {
    entries: DashMap<String, Arc<OnceCell<FetchOutcome>>>,
}

impl PackumentCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get or create the fetch cell for a request URL.
    ///
    /// The insert is an atomic check-or-insert; all callers racing on the
    /// same URL receive the same cell.
    pub fn entry(&self, url: &str) -> Arc<OnceCell<FetchOutcome>> {
        self.entries
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Check whether a URL has a completed outcome (success or failure)
    pub fn contains(&self, url: &str) -> bool {
        self.entries
            .get(url)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// Number of tracked URLs, in-flight entries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no URL has been requested through this cache
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries, completed and in-flight alike
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests;

//! Peer-aware dependency resolution engine for sprig.
//!
//! Given a manifest's declared dependencies, a set of anchor packages, and a
//! version selector, this crate resolves concrete, non-downgrading version
//! constraints for the anchors and every peer dependency reachable from
//! them, merging overlapping constraints by range intersection and failing
//! the whole run on downgrades or irreconcilable constraints.

pub mod engine;
pub mod semver;

// Re-export main types
pub use engine::{ResolutionState, Resolver, DEFAULT_SELECTOR};
pub use semver::{select, Constraint, Selected};

use sprig_core::error::SprigError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SprigError>;

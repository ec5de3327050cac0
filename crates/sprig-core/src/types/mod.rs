//! Core data types for sprig.
//!
//! - Version types with npm-flavored range semantics
//! - Manifest and dependency-field types

pub mod manifest;
pub mod version;

// Re-export all public types
pub use manifest::{DependencyField, Manifest};
pub use version::{Comparator, Op, PartialVersion, Version, VersionError, VersionReq};

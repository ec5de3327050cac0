//! # sprig-core
//!
//! Core types shared across the sprig crates.
//!
//! This crate provides:
//! - `Version` and `VersionReq` types with npm-flavored range semantics
//! - `Manifest` and `DependencyField` types for package manifests
//! - `SprigError` enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Manifest, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SprigError, SprigResult};
pub use types::{
    Comparator, DependencyField, Manifest, Op, PartialVersion, Version, VersionError, VersionReq,
};

//! Package manifest types.
//!
//! A `Manifest` is the parsed shape of a `package.json` the caller hands to
//! the resolution engine. Reading and writing the file itself is the
//! caller's job; this crate never touches the filesystem.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The four dependency fields a manifest may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyField {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
}

impl DependencyField {
    /// All fields, in the order the resolution walk visits them
    pub const ALL: [DependencyField; 4] = [
        DependencyField::Dependencies,
        DependencyField::DevDependencies,
        DependencyField::PeerDependencies,
        DependencyField::OptionalDependencies,
    ];

    /// The manifest key for this field
    pub fn key(&self) -> &'static str {
        match self {
            DependencyField::Dependencies => "dependencies",
            DependencyField::DevDependencies => "devDependencies",
            DependencyField::PeerDependencies => "peerDependencies",
            DependencyField::OptionalDependencies => "optionalDependencies",
        }
    }
}

/// Parsed package manifest.
///
/// Only the fields the resolver cares about are modeled; anything else in
/// the document is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<IndexMap<String, String>>,

    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub dev_dependencies: Option<IndexMap<String, String>>,

    #[serde(
        default,
        rename = "peerDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub peer_dependencies: Option<IndexMap<String, String>>,

    #[serde(
        default,
        rename = "optionalDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub optional_dependencies: Option<IndexMap<String, String>>,
}

impl Manifest {
    /// Access one dependency field, if the manifest declares it
    pub fn field(&self, field: DependencyField) -> Option<&IndexMap<String, String>> {
        match field {
            DependencyField::Dependencies => self.dependencies.as_ref(),
            DependencyField::DevDependencies => self.dev_dependencies.as_ref(),
            DependencyField::PeerDependencies => self.peer_dependencies.as_ref(),
            DependencyField::OptionalDependencies => self.optional_dependencies.as_ref(),
        }
    }

    /// Mutable access to one dependency field
    pub fn field_mut(&mut self, field: DependencyField) -> Option<&mut IndexMap<String, String>> {
        match field {
            DependencyField::Dependencies => self.dependencies.as_mut(),
            DependencyField::DevDependencies => self.dev_dependencies.as_mut(),
            DependencyField::PeerDependencies => self.peer_dependencies.as_mut(),
            DependencyField::OptionalDependencies => self.optional_dependencies.as_mut(),
        }
    }

    /// Iterate over every declared dependency across all four fields
    pub fn declared_dependencies(
        &self,
    ) -> impl Iterator<Item = (DependencyField, &String, &String)> {
        DependencyField::ALL.into_iter().flat_map(move |field| {
            self.field(field)
                .into_iter()
                .flat_map(move |deps| deps.iter().map(move |(n, v)| (field, n, v)))
        })
    }

    /// Apply a resolved constraint mapping to this manifest.
    ///
    /// Overwrites matching keys in each present dependency field and leaves
    /// every other entry untouched. Packages in `resolved` that the manifest
    /// does not declare are not added.
    pub fn apply_constraints(&mut self, resolved: &IndexMap<String, String>) {
        for field in DependencyField::ALL {
            if let Some(deps) = self.field_mut(field) {
                for (name, constraint) in resolved {
                    if let Some(declared) = deps.get_mut(name) {
                        *declared = constraint.clone();
                    }
                }
            }
        }
    }
}

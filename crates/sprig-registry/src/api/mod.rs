//! npm registry API response types.
//!
//! A packument is the registry's full view of one package. Only the fields
//! the resolver consumes are modeled; every other key in the document is
//! ignored rather than dynamically accessed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Package metadata document from the registry.
///
/// The registry guarantees `dist-tags` and `versions` on every published
/// package; deserialization fails if either is missing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Packument {
    /// Package name
    pub name: String,
    /// Dist-tag name to version string (e.g. `latest` -> `3.0.0`)
    #[serde(rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    /// Every published version string to that version's manifest
    pub versions: HashMap<String, VersionManifest>,
}

/// Manifest of a single published version
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionManifest {
    /// Version string
    #[serde(default)]
    pub version: String,
    /// Regular dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<IndexMap<String, String>>,
    /// Peer dependencies; the only field the resolution walk follows
    #[serde(
        default,
        rename = "peerDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub peer_dependencies: Option<IndexMap<String, String>>,
}

impl Packument {
    /// Look up the manifest of one published version
    pub fn version(&self, version: &str) -> Option<&VersionManifest> {
        self.versions.get(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packument_deserialization() {
        let packument: Packument = serde_json::from_value(serde_json::json!({
            "name": "react",
            "description": "ignored",
            "dist-tags": { "latest": "18.2.0" },
            "versions": {
                "18.2.0": {
                    "version": "18.2.0",
                    "peerDependencies": { "loose-envify": "^1.1.0" },
                    "dist": { "tarball": "ignored", "shasum": "ignored" }
                }
            },
            "time": { "created": "2011-10-26T17:46:21.942Z" }
        }))
        .unwrap();

        assert_eq!(packument.name, "react");
        assert_eq!(packument.dist_tags.get("latest"), Some(&"18.2.0".to_string()));
        let manifest = packument.version("18.2.0").unwrap();
        assert_eq!(
            manifest.peer_dependencies.as_ref().unwrap().get("loose-envify"),
            Some(&"^1.1.0".to_string())
        );
    }

    #[test]
    fn test_packument_requires_dist_tags_and_versions() {
        let result: Result<Packument, _> =
            serde_json::from_value(serde_json::json!({ "name": "broken" }));
        assert!(result.is_err());
    }
}

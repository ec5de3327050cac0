//! Semantic version types with npm-flavored range semantics.
//!
//! The `semver` crate implements Cargo's interpretation, where a bare version
//! like `1.2.3` means `^1.2.3`. npm treats a bare version as exact, gives
//! caret special behavior below `1.0.0`, and only matches prerelease versions
//! against comparators anchored at the same version triple. These types
//! follow the npm rules.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// Version requirement (`^1.0.0`, `~2.3.0`, `>=1.0.0 <2.0.0`)
///
/// Comparators are implicitly AND-ed: a version matches the requirement only
/// if it matches every comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    pub comparators: Vec<Comparator>,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: PartialVersion,
}

/// Comparison operator for version requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,     // =1.0.0 or bare 1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
    Tilde,     // ~1.0.0
    Caret,     // ^1.0.0
    Wildcard,  // *
}

/// Partial version for comparators (missing components act as wildcards)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("invalid version requirement: {input}")]
    InvalidRequirement { input: String },
}

impl Version {
    /// Create a new version without prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Check if this version satisfies a version requirement
    pub fn satisfies(&self, req: &VersionReq) -> bool {
        req.matches(self)
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Precedence comparison per the SemVer spec (build metadata ignored)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            },
            other => other,
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        // Split on '-' for prerelease
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let component = |part: &str| -> Result<u64, VersionError> {
            part.parse().map_err(|_| VersionError::InvalidNumber {
                component: part.to_string(),
            })
        };

        Ok(Version {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl VersionReq {
    /// Parse a version requirement string.
    ///
    /// Accepts a single comparator (`^1.2.3`, `>=1.2`, `1.2.3`), a
    /// space-separated conjunction (`>=1.0.0 <2.0.0`), or the wildcard `*`.
    /// A bare version is an exact requirement, as npm interprets it.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();

        if trimmed.is_empty() || Self::is_wildcard_token(trimmed) {
            return Ok(VersionReq {
                comparators: vec![Comparator::wildcard()],
            });
        }

        let comparators = trimmed
            .split_whitespace()
            .map(Comparator::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::InvalidRequirement {
                input: input.to_string(),
            })?;

        Ok(VersionReq { comparators })
    }

    fn is_wildcard_token(token: &str) -> bool {
        matches!(token, "*" | "x" | "X")
    }

    /// Check if a version matches this requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|comp| comp.matches(version))
    }

    /// The smallest version this requirement can admit.
    ///
    /// Comparators are AND-ed, so the requirement's lower bound is the
    /// greatest of the per-comparator lower bounds. Used for downgrade
    /// detection and for picking a merge representative.
    pub fn min_version(&self) -> Version {
        self.comparators
            .iter()
            .map(Comparator::lower_bound)
            .max()
            .unwrap_or_else(|| Version::new(0, 0, 0))
    }

    /// Non-empty-intersection test for two requirements.
    ///
    /// The ranges this system produces are upward-bounded intervals, so two
    /// of them intersect iff either contains the other's minimum.
    pub fn intersects(&self, other: &VersionReq) -> bool {
        self.matches(&other.min_version()) || other.matches(&self.min_version())
    }
}

impl Comparator {
    fn wildcard() -> Self {
        Comparator {
            op: Op::Wildcard,
            version: PartialVersion {
                major: 0,
                minor: None,
                patch: None,
                prerelease: None,
            },
        }
    }

    /// Parse a single comparator token
    pub fn parse(token: &str) -> Result<Self, VersionError> {
        if VersionReq::is_wildcard_token(token) {
            return Ok(Self::wildcard());
        }

        let (op, version_str) = if let Some(stripped) = token.strip_prefix("^") {
            (Op::Caret, stripped)
        } else if let Some(stripped) = token.strip_prefix("~") {
            (Op::Tilde, stripped)
        } else if let Some(stripped) = token.strip_prefix(">=") {
            (Op::GreaterEq, stripped)
        } else if let Some(stripped) = token.strip_prefix("<=") {
            (Op::LessEq, stripped)
        } else if let Some(stripped) = token.strip_prefix(">") {
            (Op::Greater, stripped)
        } else if let Some(stripped) = token.strip_prefix("<") {
            (Op::Less, stripped)
        } else if let Some(stripped) = token.strip_prefix("=") {
            (Op::Exact, stripped)
        } else {
            (Op::Exact, token)
        };

        let version = PartialVersion::from_str(version_str)?;
        Ok(Comparator { op, version })
    }

    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        if version.is_prerelease() && !self.admits_prerelease(version) {
            return false;
        }

        match self.op {
            Op::Exact => self.version.matches_exact(version),
            Op::Wildcard => true,
            Op::Greater => version > &self.version.to_version(),
            Op::GreaterEq => version >= &self.version.to_version(),
            Op::Less => version < &self.version.to_version(),
            Op::LessEq => version <= &self.version.to_version(),
            Op::Tilde => self.version.matches_tilde(version),
            Op::Caret => self.version.matches_caret(version),
        }
    }

    // npm rule: a prerelease version only satisfies a comparator whose own
    // version carries a prerelease on the same major.minor.patch triple.
    fn admits_prerelease(&self, version: &Version) -> bool {
        match (&self.version.prerelease, self.version.minor, self.version.patch) {
            (Some(_), Some(minor), Some(patch)) => {
                version.major == self.version.major
                    && version.minor == minor
                    && version.patch == patch
            }
            _ => false,
        }
    }

    /// The smallest version this comparator can admit
    fn lower_bound(&self) -> Version {
        match self.op {
            Op::Less | Op::LessEq | Op::Wildcard => Version::new(0, 0, 0),
            Op::Greater => {
                // Strictly above the base; the next patch level is close
                // enough for interval comparisons over published versions.
                let mut v = self.version.to_version();
                v.prerelease = None;
                v.patch += 1;
                v
            }
            _ => self.version.to_version(),
        }
    }
}

impl PartialVersion {
    /// Convert to a full version (filling missing parts with 0)
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
        }
    }

    /// Check exact match (missing components match anything)
    fn matches_exact(&self, version: &Version) -> bool {
        version.major == self.major
            && self.minor.map_or(true, |m| version.minor == m)
            && self.patch.map_or(true, |p| version.patch == p)
            && version.prerelease == self.prerelease
    }

    /// Tilde match: `~1.2.3` allows `>=1.2.3 <1.3.0`; `~1` allows `>=1.0.0 <2.0.0`
    fn matches_tilde(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }
        let Some(minor) = self.minor else {
            return true;
        };
        version.minor == minor && version >= &self.to_version()
    }

    /// Caret match: compatible up to the leftmost non-zero component.
    ///
    /// `^1.2.3` allows `>=1.2.3 <2.0.0`, `^0.2.3` allows `>=0.2.3 <0.3.0`,
    /// and `^0.0.3` pins `0.0.3` exactly.
    fn matches_caret(&self, version: &Version) -> bool {
        if version < &self.to_version() {
            return false;
        }
        if self.major > 0 {
            return version.major == self.major;
        }
        match self.minor {
            None => version.major == 0,
            Some(0) => match self.patch {
                None => version.major == 0 && version.minor == 0,
                Some(patch) => {
                    version.major == 0 && version.minor == 0 && version.patch == patch
                }
            },
            Some(minor) => version.major == 0 && version.minor == minor,
        }
    }
}

impl FromStr for PartialVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        // Build metadata is irrelevant to range matching
        let version_part = input.split_once('+').map_or(input, |(v, _)| v);

        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let component = |part: &str| -> Result<Option<u64>, VersionError> {
            if matches!(part, "x" | "X" | "*") {
                return Ok(None);
            }
            part.parse().map(Some).map_err(|_| VersionError::InvalidNumber {
                component: part.to_string(),
            })
        };

        let major = component(parts[0])?.ok_or_else(|| VersionError::InvalidFormat {
            input: input.to_string(),
        })?;
        let minor = parts.get(1).map(|p| component(p)).transpose()?.flatten();
        let patch = parts.get(2).map(|p| component(p)).transpose()?.flatten();

        Ok(PartialVersion {
            major,
            minor,
            patch,
            prerelease,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = Version::from_str("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build, None);
    }

    #[test]
    fn test_version_with_prerelease_and_build() {
        let v = Version::from_str("1.2.3-alpha.1").unwrap();
        assert_eq!(v.prerelease, Some("alpha.1".to_string()));

        let v = Version::from_str("1.2.3+build.1").unwrap();
        assert_eq!(v.build, Some("build.1".to_string()));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");

        let v = Version {
            major: 1,
            minor: 2,
            patch: 3,
            prerelease: Some("alpha".to_string()),
            build: Some("build".to_string()),
        };
        assert_eq!(v.to_string(), "1.2.3-alpha+build");
    }

    #[test]
    fn test_version_comparison() {
        let v1 = Version::new(1, 0, 0);
        let v2 = Version::new(2, 0, 0);
        let v3 = Version::new(1, 1, 0);

        assert!(v1 < v2);
        assert!(v1 < v3);
        assert!(v3 < v2);
        assert!(Version::from_str("1.0.0-alpha").unwrap() < v1);
    }

    #[test]
    fn test_bare_version_is_exact() {
        let req = VersionReq::parse("1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(!req.matches(&Version::new(1, 2, 4)));
        assert!(!req.matches(&Version::new(1, 3, 0)));
    }

    #[test]
    fn test_wildcard() {
        let req = VersionReq::parse("*").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(999, 999, 999)));
        // npm: '*' does not admit prereleases
        assert!(!req.matches(&Version::from_str("2.0.0-beta.1").unwrap()));
    }

    #[test]
    fn test_caret() {
        let req = VersionReq::parse("^1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(1, 9, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(1, 2, 2)));
    }

    #[test]
    fn test_caret_below_one() {
        let req = VersionReq::parse("^0.2.3").unwrap();
        assert!(req.matches(&Version::new(0, 2, 3)));
        assert!(req.matches(&Version::new(0, 2, 9)));
        assert!(!req.matches(&Version::new(0, 3, 0)));

        let req = VersionReq::parse("^0.0.3").unwrap();
        assert!(req.matches(&Version::new(0, 0, 3)));
        assert!(!req.matches(&Version::new(0, 0, 4)));
    }

    #[test]
    fn test_tilde() {
        let req = VersionReq::parse("~1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(1, 2, 9)));
        assert!(!req.matches(&Version::new(1, 3, 0)));

        let req = VersionReq::parse("~1").unwrap();
        assert!(req.matches(&Version::new(1, 9, 9)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_comparator_operators() {
        let v1_2_3 = Version::new(1, 2, 3);
        let v1_2_4 = Version::new(1, 2, 4);

        let req = VersionReq::parse(">1.2.3").unwrap();
        assert!(!req.matches(&v1_2_3));
        assert!(req.matches(&v1_2_4));

        let req = VersionReq::parse(">=1.2.3").unwrap();
        assert!(req.matches(&v1_2_3));

        let req = VersionReq::parse("<1.2.4").unwrap();
        assert!(req.matches(&v1_2_3));
        assert!(!req.matches(&v1_2_4));
    }

    #[test]
    fn test_conjunction() {
        let req = VersionReq::parse(">=1.0.0 <2.0.0").unwrap();
        assert!(req.matches(&Version::new(1, 5, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_partial_components() {
        let req = VersionReq::parse("^1.2").unwrap();
        assert!(req.matches(&Version::new(1, 2, 0)));
        assert!(req.matches(&Version::new(1, 9, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));

        let req = VersionReq::parse("1.2.x").unwrap();
        assert!(req.matches(&Version::new(1, 2, 7)));
        assert!(!req.matches(&Version::new(1, 3, 0)));
    }

    #[test]
    fn test_prerelease_gating() {
        let beta = Version::from_str("2.0.0-beta.1").unwrap();

        // Comparator without prerelease never admits one
        assert!(!VersionReq::parse("^2.0.0").unwrap().matches(&beta));
        assert!(!VersionReq::parse(">=1.0.0").unwrap().matches(&beta));

        // Same-triple comparator with prerelease does
        assert!(VersionReq::parse(">=2.0.0-alpha").unwrap().matches(&beta));
    }

    #[test]
    fn test_invalid_requirement() {
        assert!(VersionReq::parse("not-a-version").is_err());
        assert!(VersionReq::parse("^1.2.3.4").is_err());
        assert!(VersionReq::parse("latest").is_err());
    }

    #[test]
    fn test_min_version() {
        assert_eq!(
            VersionReq::parse("^1.2.3").unwrap().min_version(),
            Version::new(1, 2, 3)
        );
        assert_eq!(
            VersionReq::parse("~0.4.0").unwrap().min_version(),
            Version::new(0, 4, 0)
        );
        assert_eq!(
            VersionReq::parse("*").unwrap().min_version(),
            Version::new(0, 0, 0)
        );
        assert_eq!(
            VersionReq::parse(">=1.0.0 <2.0.0").unwrap().min_version(),
            Version::new(1, 0, 0)
        );
    }

    #[test]
    fn test_intersects() {
        let caret = VersionReq::parse("^1.2.0").unwrap();
        let tilde_inside = VersionReq::parse("~1.4.0").unwrap();
        let tilde_below = VersionReq::parse("~1.1.0").unwrap();
        let next_major = VersionReq::parse("^2.0.0").unwrap();

        assert!(caret.intersects(&tilde_inside));
        assert!(tilde_inside.intersects(&caret));
        assert!(!caret.intersects(&tilde_below));
        assert!(!caret.intersects(&next_major));

        let exact = VersionReq::parse("1.4.2").unwrap();
        assert!(caret.intersects(&exact));
        assert!(!exact.intersects(&VersionReq::parse("1.4.3").unwrap()));
    }
}

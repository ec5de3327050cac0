//! Version selection and constraint representation.
//!
//! Turns a version selector (dist-tag, exact version, range, or `*`) plus a
//! packument into a single concrete version-matching constraint, and keeps
//! the raw/parsed pair together so the engine can intersect and re-encode
//! constraints without reparsing.

use std::fmt;
use std::str::FromStr;

use sprig_core::error::SprigError;
use sprig_core::types::{Comparator, Op, PartialVersion, Version, VersionError, VersionReq};
use sprig_registry::Packument;

use crate::ResolverResult;

/// A resolved version constraint: the manifest-facing string together with
/// its parsed requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    raw: String,
    req: VersionReq,
}

/// Outcome of version selection: the concrete matched version and the
/// constraint encoding the selector's operator shape around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub version: Version,
    pub constraint: Constraint,
}

impl Constraint {
    /// Parse a constraint from a raw selector string
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(raw)?;
        Ok(Self {
            raw: raw.trim().to_string(),
            req,
        })
    }

    /// Pin a concrete version exactly
    pub fn pinned(version: &Version) -> Self {
        Self::around(version, Op::Exact, "")
    }

    /// A `~`-range around a concrete version
    pub fn tilde(version: &Version) -> Self {
        Self::around(version, Op::Tilde, "~")
    }

    /// A `^`-range around a concrete version
    pub fn caret(version: &Version) -> Self {
        Self::around(version, Op::Caret, "^")
    }

    fn around(version: &Version, op: Op, prefix: &str) -> Self {
        Self {
            raw: format!("{prefix}{version}"),
            req: VersionReq {
                comparators: vec![Comparator {
                    op,
                    version: PartialVersion {
                        major: version.major,
                        minor: Some(version.minor),
                        patch: Some(version.patch),
                        prerelease: version.prerelease.clone(),
                    },
                }],
            },
        }
    }

    /// The manifest-facing constraint string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed requirement
    pub fn req(&self) -> &VersionReq {
        &self.req
    }

    /// Smallest version this constraint admits
    pub fn min_version(&self) -> Version {
        self.req.min_version()
    }

    /// Non-empty-intersection test
    pub fn intersects(&self, other: &Constraint) -> bool {
        self.req.intersects(&other.req)
    }

    /// Intersection representative of two overlapping constraints.
    ///
    /// Both inputs are upward-bounded interval ranges, so the one with the
    /// greater minimum is contained in the intersection and serves as its
    /// representative. Ties keep `self`, so re-proposing an equal constraint
    /// is a no-op. Callers must have checked `intersects` first.
    pub fn merge(&self, proposed: &Constraint) -> Constraint {
        if proposed.min_version() > self.min_version() {
            proposed.clone()
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Select a concrete version constraint for `selector` out of `packument`.
///
/// 1. A selector matching a dist-tag substitutes that tag's version,
///    `~`-widened when `loose` is set.
/// 2. Anything else must itself parse as a version or range.
/// 3. A bare exact version under `loose` widens to a `~`-range.
/// 4. The maximum published version satisfying the effective selector wins.
/// 5. The result mirrors the effective selector's operator shape: wildcard
///    and exact selectors pin the matched version, `~`/`^` prefixes are
///    preserved around it, and any other range shape becomes a `~`-range
///    around it.
pub fn select(
    packument: &Packument,
    package: &str,
    selector: &str,
    loose: bool,
) -> ResolverResult<Selected> {
    let mut effective = match packument.dist_tags.get(selector) {
        Some(tagged) if loose => format!("~{tagged}"),
        Some(tagged) => tagged.clone(),
        None => selector.to_string(),
    };

    if loose && Version::from_str(&effective).is_ok() {
        effective = format!("~{effective}");
    }

    let req = VersionReq::parse(&effective).map_err(|_| SprigError::InvalidSelector {
        package: package.to_string(),
        selector: selector.to_string(),
    })?;

    let matched = packument
        .versions
        .keys()
        .filter_map(|raw| Version::from_str(raw).ok())
        .filter(|version| req.matches(version))
        .max()
        .ok_or_else(|| SprigError::NoSatisfyingVersion {
            package: package.to_string(),
            selector: selector.to_string(),
        })?;

    let constraint = if effective.starts_with('^') {
        Constraint::caret(&matched)
    } else if effective.starts_with('~') {
        Constraint::tilde(&matched)
    } else if pins_exactly(&req) {
        Constraint::pinned(&matched)
    } else {
        Constraint::tilde(&matched)
    };

    Ok(Selected {
        version: matched,
        constraint,
    })
}

/// Wildcard and fully-specified exact selectors pin to the best match;
/// everything range-shaped stays a range.
fn pins_exactly(req: &VersionReq) -> bool {
    matches!(
        req.comparators.as_slice(),
        [Comparator {
            op: Op::Wildcard,
            ..
        }] | [Comparator {
            op: Op::Exact,
            version: PartialVersion {
                minor: Some(_),
                patch: Some(_),
                ..
            },
        }]
    )
}

//! Recursive peer-dependency resolution.
//!
//! The engine seeds from a manifest's declared dependency fields filtered by
//! the caller's targets, resolves each pending edge through the registry,
//! and recurses into the peer dependencies of every newly resolved version.
//! Sibling edges run concurrently; all constraint merges are serialized
//! through the run's `ResolutionState`, and merge order never changes the
//! outcome because merging is commutative range intersection.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::try_join_all;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use sprig_core::error::{SprigError, SprigResult};
use sprig_core::types::{Manifest, VersionReq};
use sprig_registry::RegistryClient;

use crate::semver::{select, Constraint, Selected};

/// Selector used when the caller does not supply one
pub const DEFAULT_SELECTOR: &str = "latest";

/// A dependency edge still to be resolved.
///
/// `declared` is the manifest's current value for anchor edges and `None`
/// for peer edges, which have no manifest entry to preserve or compare
/// against.
#[derive(Debug, Clone)]
struct PendingConstraint {
    name: String,
    requested: String,
    declared: Option<String>,
}

/// Accumulated constraints for one resolution run.
///
/// Owned by a single top-level invocation and never shared across runs.
/// Every mutation goes through the internal lock, which is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct ResolutionState {
    entries: Mutex<IndexMap<String, Constraint>>,
}

impl ResolutionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packages with a resolved constraint
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The current constraint string for a package, if any
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().get(name).map(|c| c.raw().to_string())
    }

    /// Snapshot the accumulated package -> constraint mapping
    pub fn constraints(&self) -> IndexMap<String, String> {
        self.entries
            .lock()
            .iter()
            .map(|(name, constraint)| (name.clone(), constraint.raw().to_string()))
            .collect()
    }

    /// Fast-path merge for a package the state already tracks.
    ///
    /// Returns `false` when the package is untracked (the caller must fetch
    /// and resolve), `true` when the proposal was intersected in place.
    /// A proposal with an empty intersection fails the run.
    fn narrow(&self, name: &str, proposed: &Constraint) -> SprigResult<bool> {
        let mut entries = self.entries.lock();
        let Some(existing) = entries.get(name) else {
            return Ok(false);
        };

        if !existing.intersects(proposed) {
            return Err(SprigError::Conflict {
                package: name.to_string(),
                existing: existing.raw().to_string(),
                proposed: proposed.raw().to_string(),
            });
        }

        let merged = existing.merge(proposed);
        trace!(package = name, constraint = %merged, "narrowed in place");
        entries.insert(name.to_string(), merged);
        Ok(true)
    }

    /// Merge a freshly resolved constraint into the state.
    ///
    /// Returns `true` when the package was not tracked before; the caller
    /// expands its peer dependencies exactly in that case. An existing
    /// constraint with an empty intersection fails the run.
    fn merge(&self, name: &str, constraint: Constraint) -> SprigResult<bool> {
        let mut entries = self.entries.lock();
        match entries.get(name) {
            None => {
                entries.insert(name.to_string(), constraint);
                Ok(true)
            }
            Some(existing) => {
                if !existing.intersects(&constraint) {
                    return Err(SprigError::Conflict {
                        package: name.to_string(),
                        existing: existing.raw().to_string(),
                        proposed: constraint.raw().to_string(),
                    });
                }
                let merged = existing.merge(&constraint);
                entries.insert(name.to_string(), merged);
                Ok(false)
            }
        }
    }
}

/// Peer-aware constraint resolver for one registry
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Registry client; its cache deduplicates fetches across branches
    client: Arc<RegistryClient>,
    /// Widen exact resolutions to `~`-ranges
    loose: bool,
}

impl Resolver {
    /// Create a resolver over a registry client
    pub fn new(client: Arc<RegistryClient>) -> Self {
        Self {
            client,
            loose: false,
        }
    }

    /// Enable or disable loose resolution
    pub fn loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }

    /// Resolve updated constraints for `anchors` and every reachable peer
    /// dependency.
    ///
    /// Every anchor is targeted at `selector` (default `latest`). Returns
    /// the final package -> constraint mapping; on any error nothing is
    /// returned and the manifest must not be mutated.
    pub async fn upgrade(
        &self,
        manifest: &Manifest,
        anchors: &[String],
        selector: Option<&str>,
    ) -> SprigResult<IndexMap<String, String>> {
        let selector = selector.unwrap_or(DEFAULT_SELECTOR);
        let targets: IndexMap<String, String> = anchors
            .iter()
            .map(|anchor| (anchor.clone(), selector.to_string()))
            .collect();

        let state = ResolutionState::new();
        self.resolve(manifest, &targets, &state).await?;

        debug!(packages = state.len(), "resolution complete");
        Ok(state.constraints())
    }

    /// Resolve the manifest's declared dependencies against `targets`,
    /// accumulating into `state`.
    ///
    /// A declared dependency is walked only when it is a target and its
    /// declared value differs from the requested selector; everything else
    /// is skipped untouched.
    pub async fn resolve(
        &self,
        manifest: &Manifest,
        targets: &IndexMap<String, String>,
        state: &ResolutionState,
    ) -> SprigResult<()> {
        let edges: Vec<PendingConstraint> = manifest
            .declared_dependencies()
            .filter_map(|(_, name, declared)| {
                let requested = targets.get(name)?;
                if requested == declared {
                    // Already at the requested value
                    return None;
                }
                Some(PendingConstraint {
                    name: name.clone(),
                    requested: requested.clone(),
                    declared: Some(declared.clone()),
                })
            })
            .collect();

        try_join_all(edges.into_iter().map(|edge| self.resolve_edge(edge, state))).await?;
        Ok(())
    }

    /// Resolve one pending edge and recurse into its peer dependencies.
    ///
    /// Boxed because the future recurses through peer expansion. On the
    /// first error `try_join_all` drops every sibling future, cancelling
    /// their in-flight fetches.
    fn resolve_edge<'a>(
        &'a self,
        edge: PendingConstraint,
        state: &'a ResolutionState,
    ) -> Pin<Box<dyn Future<Output = SprigResult<()>> + Send + 'a>> {
        Box::pin(async move {
            // Trivial narrowing fast path: a range-shaped selector proposed
            // for an already-tracked package intersects locally, with no
            // fetch and no peer expansion.
            if let Ok(proposed) = Constraint::parse(&edge.requested) {
                if state.narrow(&edge.name, &proposed)? {
                    return Ok(());
                }
            }

            let packument = self.client.packument(&edge.name).await?;
            let Selected {
                version,
                constraint,
            } = select(&packument, &edge.name, &edge.requested, self.loose)?;

            // An anchor keeps its manifest range operator around the newly
            // matched version; peer edges keep the selector's own shape.
            let constraint = match edge.declared.as_deref() {
                Some(declared) if declared.starts_with('^') => Constraint::caret(&version),
                Some(declared) if declared.starts_with('~') => Constraint::tilde(&version),
                _ => constraint,
            };

            // An update must never move a dependency backward
            if let Some(declared) = &edge.declared {
                if let Ok(current) = VersionReq::parse(declared) {
                    if constraint.min_version() < current.min_version() {
                        return Err(SprigError::Downgrade {
                            package: edge.name.clone(),
                            current: declared.clone(),
                            proposed: constraint.raw().to_string(),
                        });
                    }
                }
            }

            debug!(package = %edge.name, constraint = %constraint, "resolved");
            let newly_tracked = state.merge(&edge.name, constraint)?;

            // Peer expansion happens once per package, on first resolution;
            // later co-occurrences merge through the fast path above.
            if !newly_tracked {
                return Ok(());
            }

            let peers = packument
                .version(&version.to_string())
                .and_then(|manifest| manifest.peer_dependencies.as_ref());

            if let Some(peers) = peers {
                let peer_edges: Vec<PendingConstraint> = peers
                    .iter()
                    .map(|(name, selector)| PendingConstraint {
                        name: name.clone(),
                        requested: selector.clone(),
                        declared: None,
                    })
                    .collect();

                trace!(package = %edge.name, peers = peer_edges.len(), "expanding peers");
                try_join_all(
                    peer_edges
                        .into_iter()
                        .map(|peer| self.resolve_edge(peer, state)),
                )
                .await?;
            }

            Ok(())
        })
    }
}

//! HTTP client for packument retrieval.
//!
//! One GET per package name per cache lifetime: lookups go through the
//! injected `PackumentCache`, so concurrent callers share a single in-flight
//! request. No retries happen here; retry policy is a caller concern.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;
use url::Url;

use crate::api::Packument;
use crate::cache::PackumentCache;
use crate::RegistryResult;
use sprig_core::error::SprigError;

/// Default public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Abbreviated-metadata media type; the corgi document still carries
/// dist-tags, versions, and peerDependencies.
const ACCEPT_METADATA: &str = "application/vnd.npm.install-v1+json";

/// Registry client with connection pooling and single-flight caching
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Base registry URL, no trailing slash
    base_url: String,
    /// Single-flight packument cache
    cache: Arc<PackumentCache>,
}

impl RegistryClient {
    /// Create a client against the public npm registry with a fresh cache
    pub fn new() -> RegistryResult<Self> {
        Self::with_cache(DEFAULT_REGISTRY, Arc::new(PackumentCache::new()))
    }

    /// Create a client against a custom registry with a fresh cache
    pub fn with_registry(base_url: impl Into<String>) -> RegistryResult<Self> {
        Self::with_cache(base_url, Arc::new(PackumentCache::new()))
    }

    /// Create a client with an injected cache.
    ///
    /// Sharing one cache across clients extends request deduplication across
    /// resolution runs within the same process.
    pub fn with_cache(
        base_url: impl Into<String>,
        cache: Arc<PackumentCache>,
    ) -> RegistryResult<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        Url::parse(&base_url)
            .map_err(|e| SprigError::registry("registry", format!("invalid registry URL: {e}")))?;

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent("sprig/0.1.0")
            .build()
            .map_err(|e| {
                SprigError::registry("registry", format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    /// The cache this client deduplicates through
    pub fn cache(&self) -> &Arc<PackumentCache> {
        &self.cache
    }

    /// Fetch the packument for a package, deduplicated through the cache.
    ///
    /// N concurrent callers requesting the same package trigger exactly one
    /// network call and all observe its result. A transport or parse failure
    /// is memoized too, so repeated requests fail fast within this cache's
    /// lifetime rather than retrying the network.
    pub async fn packument(&self, package_name: &str) -> RegistryResult<Arc<Packument>> {
        let url = self.packument_url(package_name);
        let cell = self.cache.entry(&url);
        cell.get_or_init(|| self.fetch_packument(package_name, &url))
            .await
            .clone()
    }

    async fn fetch_packument(
        &self,
        package_name: &str,
        url: &str,
    ) -> RegistryResult<Arc<Packument>> {
        debug!(package = package_name, url, "fetching packument");

        let response = self
            .client
            .get(url)
            .header("Accept", ACCEPT_METADATA)
            .send()
            .await
            .map_err(|e| SprigError::registry(package_name, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SprigError::Registry {
                package: package_name.to_string(),
                message: format!("registry returned HTTP {status}"),
            });
        }

        // Accumulate the full body, then parse it as strict JSON
        let body = response
            .text()
            .await
            .map_err(|e| SprigError::registry(package_name, format!("failed to read body: {e}")))?;

        let packument: Packument = serde_json::from_str(&body).map_err(|e| {
            SprigError::registry(package_name, format!("failed to parse packument: {e}"))
        })?;

        Ok(Arc::new(packument))
    }

    /// Request URL for a package's packument
    fn packument_url(&self, package_name: &str) -> String {
        format!("{}/{}", self.base_url, Self::encode_package_name(package_name))
    }

    /// Encode a package name for the request path; the literal `/` in a
    /// scoped name is percent-encoded.
    fn encode_package_name(name: &str) -> String {
        if name.starts_with('@') {
            name.replace('/', "%2f")
        } else {
            name.to_string()
        }
    }
}

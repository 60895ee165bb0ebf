//! Geometry acquisition
//!
//! Three-way source resolution for layers: inline data, direct URLs, and the
//! layer API for database-backed records. Remote retrievals go through the
//! injectable [`Fetcher`] seam and land in a memoizing URL cache, so repeated
//! assemblies of the same configuration hit the network once per source.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;
use tracing::{debug, trace};

use crate::config::{LayerConfig, SourceKind};
use crate::feature::FeatureCollection;
use crate::{MapError, Result};

/// Default endpoint root for `database` layer sources.
const DEFAULT_API_ROOT: &str = "/api/layers";

/// Byte-level fetch seam for geometry endpoints.
///
/// The engine never talks to the network directly; it consumes whatever
/// implements this trait, which keeps tests hermetic and lets embedders
/// supply their own transport.
pub trait Fetcher: Send + Sync {
    /// Fetch the raw response body behind `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Real fetcher backed by an async reqwest client.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Fetcher with a 30 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        trace!(url = url, "HTTP GET request starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            MapError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Fetch {
                url: url.to_string(),
                status_text: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| MapError::Transport {
            url: url.to_string(),
            reason: format!("failed to read response body: {}", e),
        })?;

        trace!(url = url, bytes = bytes.len(), "HTTP response body read");
        Ok(bytes.to_vec())
    }
}

/// Memoizing URL to feature collection cache.
///
/// Owned and injectable so embedders control its scope and tests can reset
/// it. Only successful parses are stored; a failed layer is retried on the
/// next assembly. The default is unbounded, sized for deployments serving a
/// stable set of layer sources.
pub struct GeometryCache {
    entries: Mutex<LruCache<String, Arc<FeatureCollection>>>,
}

impl GeometryCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Cache evicting least-recently-used entries beyond `capacity`.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached collection for `url`, refreshing its recency.
    pub fn get(&self, url: &str) -> Option<Arc<FeatureCollection>> {
        self.entries.lock().unwrap().get(url).cloned()
    }

    /// Store a resolved collection under its source URL.
    pub fn insert(&self, url: String, collection: Arc<FeatureCollection>) {
        self.entries.lock().unwrap().put(url, collection);
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves layer geometry from inline data, direct URLs, or the layer API,
/// memoizing remote collections by URL.
pub struct SourceResolver<F> {
    fetcher: F,
    cache: Arc<GeometryCache>,
    api_root: String,
    timeout: Option<Duration>,
}

impl<F: Fetcher> SourceResolver<F> {
    /// Resolver with its own unbounded cache.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Arc::new(GeometryCache::new()),
            api_root: DEFAULT_API_ROOT.to_string(),
            timeout: None,
        }
    }

    /// Share an existing cache, e.g. across resolvers.
    pub fn with_cache(mut self, cache: Arc<GeometryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Endpoint root for `database` sources. Default: `/api/layers`
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into().trim_end_matches('/').to_string();
        self
    }

    /// Upper bound on a single retrieval. Elapsing it fails that layer like
    /// any other fetch failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Handle to the shared cache.
    #[inline]
    pub fn cache(&self) -> &Arc<GeometryCache> {
        &self.cache
    }

    /// Resolve the geometry for one layer.
    ///
    /// Inline data short-circuits without touching the cache. URL-backed
    /// sources are served from the cache when possible, otherwise fetched,
    /// parsed and memoized. `Ok(None)` signals a layer with nothing to
    /// render: no inline data and no resolvable URL.
    pub async fn resolve(&self, layer: &LayerConfig) -> Result<Option<Arc<FeatureCollection>>> {
        if let Some(data) = &layer.data {
            trace!(layer = %layer.name, "using inline feature collection");
            return Ok(Some(Arc::new(data.clone())));
        }

        let Some(url) = self.source_url(layer) else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.get(&url) {
            debug!(layer = %layer.name, url = %url, "geometry cache hit");
            return Ok(Some(cached));
        }

        debug!(layer = %layer.name, url = %url, "fetching geometry");
        let bytes = self.fetch_with_timeout(&url).await?;
        let collection: FeatureCollection =
            serde_json::from_slice(&bytes).map_err(|source| MapError::Parse {
                url: url.clone(),
                source,
            })?;

        let collection = Arc::new(collection);
        self.cache.insert(url, collection.clone());
        Ok(Some(collection))
    }

    /// The retrieval URL for a layer, if its source kind yields one.
    fn source_url(&self, layer: &LayerConfig) -> Option<String> {
        match layer.source {
            SourceKind::Database => Some(format!("{}/{}/geojson", self.api_root, layer.id)),
            SourceKind::Url => layer.source_url.clone().filter(|url| !url.is_empty()),
            SourceKind::Inline => None,
        }
    }

    async fn fetch_with_timeout(&self, url: &str) -> Result<Vec<u8>> {
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.fetcher.fetch(url)).await {
                Ok(result) => result,
                Err(_) => Err(MapError::Transport {
                    url: url.to_string(),
                    reason: format!("no response within {:?}", limit),
                }),
            },
            None => self.fetcher.fetch(url).await,
        }
    }
}

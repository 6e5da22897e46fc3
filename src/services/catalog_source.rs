//! Catalog source
//!
//! Loads the catalog from the configured upstream (a local JSON file, a JSON
//! catalog URL, or a list of M3U playlists), keeps it in memory for the
//! configured duration, and never hands callers an error: a failed load
//! serves the last good catalog, or an empty one.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;
use url::Url;

use crate::config::Config;
use crate::models::Catalog;
use crate::services::catalog_builder::build_catalog;
use crate::services::m3u_parser::parse_m3u;
use crate::services::metrics::{CATALOG_CACHE_HITS, CATALOG_LOADS, PLAYLIST_FETCHES};

/// Errors while loading the catalog from its upstream
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("response too large: {size_mb:.1}MB (limit {limit_mb}MB)")]
    TooLarge { size_mb: f64, limit_mb: u64 },

    #[error("invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid upstream URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Carries the per-playlist report over an empty catalog
    #[error("no playlist could be loaded")]
    NoPlaylistLoaded(Box<CatalogSnapshot>),

    #[error("no catalog source configured")]
    NotConfigured,
}

/// Outcome of one playlist fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Ok,
    Error,
}

/// Per-playlist fetch report, served alongside the catalog
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistStatus {
    pub url: String,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: usize,
}

/// Catalog as served by `/api/channels`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    #[serde(flatten)]
    pub catalog: Catalog,
    pub status_lists: Vec<PlaylistStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    fn new(catalog: Catalog, status_lists: Vec<PlaylistStatus>) -> Self {
        Self {
            catalog,
            status_lists,
            fetched_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone)]
enum Upstream {
    File(PathBuf),
    Json(Url),
    /// First playlist has priority on duplicate names
    Playlists(Vec<Url>),
    /// Catalog handed in at construction, never refreshed
    Fixed,
    Unconfigured,
}

impl Upstream {
    fn from_config(config: &Config) -> Result<Self, SourceError> {
        if let Some(path) = &config.catalog_file {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some(url) = &config.catalog_url {
            return Ok(Self::Json(parse_upstream_url(url)?));
        }
        if !config.playlist_urls.is_empty() {
            let urls = config
                .playlist_urls
                .iter()
                .map(|url| parse_upstream_url(url))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Playlists(urls));
        }
        Ok(Self::Unconfigured)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Json(_) => "json",
            Self::Playlists(_) => "playlists",
            Self::Fixed => "preloaded",
            Self::Unconfigured => "none",
        }
    }
}

fn parse_upstream_url(raw: &str) -> Result<Url, SourceError> {
    let url = Url::parse(raw).map_err(|e| SourceError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SourceError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", other),
        }),
    }
}

/// Exponential backoff: 500ms, 1s, 2s, ... capped at 10s
fn backoff(attempt: u32) -> Duration {
    let ms = (1u64 << attempt.min(16)).saturating_mul(500).min(10_000);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone)]
struct CachedSnapshot {
    loaded_at: Instant,
    snapshot: Arc<CatalogSnapshot>,
}

/// Cached access to the upstream catalog
pub struct CatalogSource {
    client: Client,
    upstream: Upstream,
    cache_ttl: Duration,
    max_retries: u32,
    max_bytes: u64,
    cached: RwLock<Option<CachedSnapshot>>,
    /// Serializes reloads so concurrent misses trigger one fetch
    refresh: Mutex<()>,
}

impl CatalogSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            upstream: Upstream::from_config(config)?,
            cache_ttl: Duration::from_secs(config.cache_duration_secs),
            max_retries: config.max_retries,
            max_bytes: (config.max_playlist_size_mb as u64) * 1024 * 1024,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    /// Source that always serves `catalog`
    pub fn preloaded(catalog: Catalog) -> Self {
        let cached = CachedSnapshot {
            loaded_at: Instant::now(),
            snapshot: Arc::new(CatalogSnapshot::new(catalog, Vec::new())),
        };

        Self {
            client: Client::new(),
            upstream: Upstream::Fixed,
            cache_ttl: Duration::MAX,
            max_retries: 0,
            max_bytes: 0,
            cached: RwLock::new(Some(cached)),
            refresh: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.upstream.kind()
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.upstream, Upstream::Unconfigured)
    }

    /// Age of the cached catalog, if one is loaded
    pub async fn cache_age(&self) -> Option<Duration> {
        self.cached
            .read()
            .await
            .as_ref()
            .map(|cached| cached.loaded_at.elapsed())
    }

    /// Current catalog. Never fails: a failed reload serves the last good
    /// catalog, or an empty one when nothing was loaded yet.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        if let Some(hit) = self.fresh().await {
            CATALOG_CACHE_HITS.inc();
            return hit;
        }

        let _guard = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // a reload is in flight, don't wait on it when stale data exists
                if let Some(stale) = self.stale().await {
                    CATALOG_CACHE_HITS.inc();
                    return stale;
                }
                self.refresh.lock().await
            }
        };
        // another request may have reloaded while we waited
        if let Some(hit) = self.fresh().await {
            CATALOG_CACHE_HITS.inc();
            return hit;
        }

        let started = Instant::now();
        match self.load().await {
            Ok(snapshot) => {
                CATALOG_LOADS.with_label_values(&["ok"]).inc();
                tracing::info!(
                    source = self.kind(),
                    entries = snapshot.catalog.entry_count(),
                    categories = snapshot.catalog.categories.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Catalog loaded"
                );

                let snapshot = Arc::new(snapshot);
                *self.cached.write().await = Some(CachedSnapshot {
                    loaded_at: Instant::now(),
                    snapshot: snapshot.clone(),
                });
                snapshot
            }
            Err(SourceError::NotConfigured) => {
                tracing::debug!("No catalog source configured, serving empty catalog");
                Arc::new(CatalogSnapshot::default())
            }
            Err(e) => {
                CATALOG_LOADS.with_label_values(&["error"]).inc();
                self.fallback(e).await
            }
        }
    }

    /// Snapshot served after a failed load. Never cached, so the next
    /// request retries the upstream.
    async fn fallback(&self, err: SourceError) -> Arc<CatalogSnapshot> {
        let stale = self.stale().await;

        match (stale, err) {
            (Some(stale), SourceError::NoPlaylistLoaded(report)) => {
                tracing::warn!("Every playlist failed, serving stale catalog with fresh statuses");
                Arc::new(CatalogSnapshot {
                    catalog: stale.catalog.clone(),
                    status_lists: report.status_lists,
                    fetched_at: stale.fetched_at,
                })
            }
            (Some(stale), e) => {
                tracing::warn!("Catalog reload failed, serving stale catalog: {}", e);
                stale
            }
            (None, SourceError::NoPlaylistLoaded(report)) => {
                tracing::warn!("Every playlist failed, serving empty catalog");
                Arc::from(report)
            }
            (None, e) => {
                tracing::warn!("Catalog load failed, serving empty catalog: {}", e);
                Arc::new(CatalogSnapshot::default())
            }
        }
    }

    /// Last loaded snapshot, whatever its age
    async fn stale(&self) -> Option<Arc<CatalogSnapshot>> {
        self.cached.read().await.as_ref().map(|c| c.snapshot.clone())
    }

    async fn fresh(&self) -> Option<Arc<CatalogSnapshot>> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|c| matches!(self.upstream, Upstream::Fixed) || c.loaded_at.elapsed() < self.cache_ttl)
            .map(|c| c.snapshot.clone())
    }

    async fn load(&self) -> Result<CatalogSnapshot, SourceError> {
        match &self.upstream {
            Upstream::File(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                let value: Value = serde_json::from_str(&text)?;
                Ok(CatalogSnapshot::new(Catalog::from_value(&value), Vec::new()))
            }
            Upstream::Json(url) => {
                let text = self.fetch_text(url).await?;
                let value: Value = serde_json::from_str(&text)?;
                Ok(CatalogSnapshot::new(Catalog::from_value(&value), Vec::new()))
            }
            Upstream::Playlists(urls) => self.load_playlists(urls).await,
            Upstream::Fixed => Ok(CatalogSnapshot::default()),
            Upstream::Unconfigured => Err(SourceError::NotConfigured),
        }
    }

    async fn load_playlists(&self, urls: &[Url]) -> Result<CatalogSnapshot, SourceError> {
        let results = join_all(urls.iter().map(|url| self.fetch_text(url))).await;

        let mut statuses = Vec::with_capacity(urls.len());
        let mut playlists = Vec::new();

        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(text) => {
                    let entries = parse_m3u(&text);
                    PLAYLIST_FETCHES.with_label_values(&["ok"]).inc();
                    tracing::debug!("Playlist {} parsed: {} entries", url, entries.len());
                    statuses.push(PlaylistStatus {
                        url: url.to_string(),
                        status: FetchStatus::Ok,
                        error: None,
                        entries: entries.len(),
                    });
                    playlists.push(entries);
                }
                Err(e) => {
                    PLAYLIST_FETCHES.with_label_values(&["error"]).inc();
                    tracing::warn!("Playlist {} failed: {}", url, e);
                    statuses.push(PlaylistStatus {
                        url: url.to_string(),
                        status: FetchStatus::Error,
                        error: Some(e.to_string()),
                        entries: 0,
                    });
                }
            }
        }

        if playlists.is_empty() {
            let report = CatalogSnapshot::new(build_catalog(Vec::new()), statuses);
            return Err(SourceError::NoPlaylistLoaded(Box::new(report)));
        }

        Ok(CatalogSnapshot::new(build_catalog(playlists), statuses))
    }

    /// GET with retries on network errors and 429, size-capped body
    async fn fetch_text(&self, url: &Url) -> Result<String, SourceError> {
        let mut attempt = 0u32;

        loop {
            match self.client.get(url.clone()).send().await {
                Ok(mut resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        if let Some(len) = resp.content_length() {
                            self.check_size(len)?;
                        }
                        // chunked bodies have no length up front, cap while reading
                        let mut body = Vec::new();
                        while let Some(chunk) = resp.chunk().await? {
                            body.extend_from_slice(&chunk);
                            self.check_size(body.len() as u64)?;
                        }
                        return Ok(String::from_utf8_lossy(&body).into_owned());
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        let delay = backoff(attempt);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "429", "backoff_ms" = delay.as_millis() as u64);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(SourceError::Http {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Err(err) => {
                    if attempt < self.max_retries {
                        let delay = backoff(attempt);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "network", "backoff_ms" = delay.as_millis() as u64);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }

    fn check_size(&self, len: u64) -> Result<(), SourceError> {
        if self.max_bytes > 0 && len > self.max_bytes {
            return Err(SourceError::TooLarge {
                size_mb: len as f64 / 1024.0 / 1024.0,
                limit_mb: self.max_bytes / 1024 / 1024,
            });
        }
        Ok(())
    }
}

//! OMDb (Open Movie Database) lookups.
//!
//! Lookups never fail from the caller's point of view: every problem is
//! logged here and turned into a degraded [`CatalogRecord`] that carries the
//! searched title and nothing else.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::CatalogConfig;

/// OMDb's "no value" marker, used for missing posters among other fields.
const NOT_AVAILABLE: &str = "N/A";

/// Catalog metadata for one title. Blank strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRecord {
    pub title: String,
    pub overview: String,
    pub poster: String,
    pub year: String,
}

impl CatalogRecord {
    /// The record returned when the catalog could not help: title passthrough only.
    pub fn degraded(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.overview.is_empty() && self.poster.is_empty() && self.year.is_empty()
    }
}

/// A source of catalog metadata.
///
/// Implementations must be total: one attempt per call, every failure
/// mapped to [`CatalogRecord::degraded`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn lookup(&self, title: &str) -> CatalogRecord;
}

/// Reasons a lookup degraded. Logged, never returned.
#[derive(Error, Debug)]
enum CatalogError {
    #[error("no match in catalog: {0}")]
    NotFound(String),

    #[error("catalog returned HTTP {0}")]
    Status(u16),

    #[error("catalog did not answer within {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    poster: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    error: Option<String>,
}

impl OmdbResponse {
    fn into_record(self) -> CatalogRecord {
        CatalogRecord {
            title: available(self.title),
            overview: available(self.plot),
            poster: available(self.poster),
            year: available(self.year),
        }
    }
}

fn available(value: String) -> String {
    if value == NOT_AVAILABLE {
        String::new()
    } else {
        value
    }
}

/// OMDb title lookup client.
pub struct OmdbClient {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OmdbClient {
    pub fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Could not build catalog HTTP client ({}), using defaults", e);
                reqwest::Client::new()
            });
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            client,
        }
    }

    /// True when an API key is configured and lookups hit the network.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, api_key: &str, title: &str) -> Result<CatalogRecord, CatalogError> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", api_key), ("t", title)])
            .send();

        // The client timeout already covers this; the outer bound also caps
        // a server that trickles the body.
        let exchange = async {
            let response = request.await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::Status(status.as_u16()));
            }
            Ok(response.json::<OmdbResponse>().await?)
        };
        let body = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))??;

        if body.response.eq_ignore_ascii_case("false") {
            return Err(CatalogError::NotFound(
                body.error.unwrap_or_else(|| title.to_string()),
            ));
        }
        Ok(body.into_record())
    }
}

#[async_trait]
impl CatalogSource for OmdbClient {
    async fn lookup(&self, title: &str) -> CatalogRecord {
        let Some(api_key) = self.api_key.as_deref() else {
            return CatalogRecord::degraded(title);
        };

        match self.fetch(api_key, title).await {
            Ok(record) => record,
            Err(e @ CatalogError::NotFound(_)) => {
                tracing::debug!("Catalog lookup for {:?}: {}", title, e);
                CatalogRecord::degraded(title)
            }
            Err(e) => {
                tracing::warn!("Catalog lookup for {:?} failed: {}", title, e);
                CatalogRecord::degraded(title)
            }
        }
    }
}

/// In-memory memo of successful lookups, keyed by the searched title.
///
/// Degraded records are not stored, so a title that failed once is tried
/// again on the next listing. Lives for the process only.
pub struct CachedCatalog<C> {
    inner: C,
    entries: RwLock<HashMap<String, CatalogRecord>>,
}

impl<C: CatalogSource> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, title: &str) -> Option<CatalogRecord> {
        self.entries.read().ok()?.get(title).cloned()
    }
}

#[async_trait]
impl<C: CatalogSource> CatalogSource for CachedCatalog<C> {
    async fn lookup(&self, title: &str) -> CatalogRecord {
        if let Some(record) = self.cached(title) {
            return record;
        }

        let record = self.inner.lookup(title).await;
        if !record.is_degraded() {
            if let Ok(mut entries) = self.entries.write() {
                entries.insert(title.to_string(), record.clone());
            }
        }
        record
    }
}

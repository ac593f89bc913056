//! Snapshot persistence through the key-value cache service.
//!
//! The store owns persisted snapshots; the computer owns at most one
//! in-flight snapshot in memory. Writes always replace the whole snapshot
//! for a service key, never individual fields, so last-writer-wins is safe
//! with the single-flight guard upstream.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;

use servmap_core::types::TerritorySnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("stored snapshot for '{service_key}' is malformed: {source}")]
    Malformed {
        service_key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value persistence for territory snapshots.
///
/// Callers must treat failures as recoverable: a failed read is a cache
/// miss, a failed write costs at most one checkpoint of progress.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, service_key: &str) -> Result<Option<TerritorySnapshot>, StoreError>;
    async fn put(&self, service_key: &str, snapshot: &TerritorySnapshot)
        -> Result<(), StoreError>;
}

/// Store backed by the cache service's plain key-value HTTP interface:
/// `GET/POST {base}/territories/{service_key}`. No transactional semantics
/// are assumed across the two operations.
#[derive(Debug, Clone)]
pub struct HttpSnapshotStore {
    client: Client,
    base_url: String,
}

impl HttpSnapshotStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn territory_url(&self, service_key: &str) -> String {
        format!("{}/territories/{service_key}", self.base_url)
    }
}

#[async_trait]
impl SnapshotStore for HttpSnapshotStore {
    async fn get(&self, service_key: &str) -> Result<Option<TerritorySnapshot>, StoreError> {
        let url = self.territory_url(service_key);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let snapshot =
            serde_json::from_str::<TerritorySnapshot>(&body).map_err(|e| StoreError::Malformed {
                service_key: service_key.to_string(),
                source: e,
            })?;
        Ok(Some(snapshot))
    }

    async fn put(
        &self,
        service_key: &str,
        snapshot: &TerritorySnapshot,
    ) -> Result<(), StoreError> {
        let url = self.territory_url(service_key);
        let response = self.client.post(&url).json(snapshot).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// In-memory store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<String, TerritorySnapshot>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, service_key: &str) -> Result<Option<TerritorySnapshot>, StoreError> {
        Ok(self.snapshots.lock().await.get(service_key).cloned())
    }

    async fn put(
        &self,
        service_key: &str,
        snapshot: &TerritorySnapshot,
    ) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .await
            .insert(service_key.to_string(), snapshot.clone());
        Ok(())
    }
}

//! Storage Client Module
//!
//! The cache side's view of the storage service: a small HTTP facade with
//! per-call timeouts and a kill switch.
//!
//! The store is treated as an untrusted, occasionally unreachable
//! dependency. Every failure path resolves to a plain miss or a reported
//! failure; nothing here may leave the cache in an inconsistent state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

// == Timeouts ==
/// Budget for the health probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
/// Budget for reads, writes, and deletes.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

// == Storage Client ==
/// HTTP client for the storage service's `/api/data` surface.
#[derive(Debug)]
pub struct StorageClient {
    base_url: String,
    http: reqwest::Client,
    enabled: AtomicBool,
}

impl StorageClient {
    // == Constructor ==
    /// Creates a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            enabled: AtomicBool::new(true),
        }
    }

    fn data_url(&self, key: &str) -> String {
        format!("{}/api/data/{}", self.base_url, urlencoding::encode(key))
    }

    // == Availability ==
    /// Probes the service health endpoint with a short timeout.
    pub async fn available(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let url = format!("{}/api/health", self.base_url);
        match self
            .http
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "storage health probe failed");
                false
            }
        }
    }

    // == Save ==
    /// Write-through: persists a key/value pair. Returns success.
    pub async fn save(&self, key: &str, value: &Value) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let url = format!("{}/api/data", self.base_url);
        let result = self
            .http
            .post(&url)
            .timeout(IO_TIMEOUT)
            .json(&json!({ "key": key, "value": value }))
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(key, status = %response.status(), "storage save rejected");
                false
            }
            Err(e) => {
                warn!(key, error = %e, "storage save failed");
                false
            }
        }
    }

    // == Load ==
    /// Fetches the value for a key; metadata is discarded.
    ///
    /// Missing keys, timeouts, and malformed responses all surface as
    /// `None` — the caller asked the cache, and misses are cache
    /// semantics.
    pub async fn load(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let response = match self
            .http
            .get(self.data_url(key))
            .timeout(IO_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(key, error = %e, "storage load failed");
                return None;
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return None;
        }
        if !response.status().is_success() {
            warn!(key, status = %response.status(), "storage load rejected");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(key, error = %e, "storage load returned malformed JSON");
                return None;
            }
        };
        body.get("data")
            .and_then(|data| data.get("value"))
            .cloned()
    }

    // == Delete ==
    /// Removes a key from the store. Returns whether the store reported
    /// a deletion.
    pub async fn delete(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match self
            .http
            .delete(self.data_url(key))
            .timeout(IO_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(key, error = %e, "storage delete failed");
                false
            }
        }
    }

    // == Kill Switch ==
    /// Re-enables the client after [`disable`].
    ///
    /// [`disable`]: StorageClient::disable
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Turns every operation into a no-op that reports failure.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Whether the client will attempt I/O at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

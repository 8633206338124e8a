use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Listening-history lookups (similar artists, top artists)
    History(String),
    /// Video search results, keyed by the literal query string
    Search(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::History(key) => write!(f, "history:{}", key.to_lowercase()),
            CacheKey::Search(query) => write!(f, "search:{}", query.to_lowercase()),
        }
    }
}

/// A stored value with its insertion time and time-to-live
struct CacheEntry {
    json: String,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// In-process key/value cache with per-entry TTL
///
/// Values are stored JSON-serialized so any serde type can share one map.
/// Entries are read-through: a miss or an expired entry triggers a fresh
/// fetch that overwrites the slot. There is no eviction beyond TTL, so the
/// map grows with the set of distinct keys seen; acceptable at the engine's
/// request volume but a known limitation.
///
/// The cache is injected into each provider rather than held as a global,
/// so tests can substitute a fresh instance and assert TTL behavior.
#[derive(Clone, Default)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a fresh value from the cache by key
    ///
    /// Returns `None` on a miss or when the entry has outlived its TTL.
    /// Expired entries are left in place; the next insert overwrites them.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let entries = self.entries.read().await;

        match entries.get(&format!("{}", key)) {
            Some(entry) if entry.is_fresh() => {
                let value = serde_json::from_str(&entry.json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    /// Stores a value keyed by `key` with the current timestamp
    pub async fn insert<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            format!("{}", key),
            CacheEntry {
                json,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Returns the cached value for `key`, invoking `fetch` only on miss or expiry
    ///
    /// The freshly fetched value is stored before being returned. Concurrent
    /// callers racing on the same key may each invoke `fetch`; the last write
    /// wins, which is tolerable because fetches are idempotent.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> AppResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(cached) = self.get(key).await? {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(cached);
        }

        tracing::debug!(key = %key, "Cache miss");
        let value = fetch().await?;
        self.insert(key, &value, ttl).await;
        Ok(value)
    }

    /// Empties all entries across both keyspaces; diagnostics only
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

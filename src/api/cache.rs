//! Query cache keyed by hierarchical query keys.
//!
//! Entries are JSON values with a per-query stale time. Invalidation is by
//! key prefix, so invalidating `pets` drops every pet list and detail.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ApiError;

/// Stale time for pet queries.
pub const PETS_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Hierarchical cache key, e.g. `pets/detail/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Query keys used by the services.
pub mod keys {
    use super::QueryKey;

    pub fn pets() -> QueryKey {
        QueryKey::new(["pets"])
    }

    pub fn pet_lists() -> QueryKey {
        QueryKey::new(["pets", "list"])
    }

    pub fn pet_detail(id: &str) -> QueryKey {
        QueryKey::new(["pets", "detail", id])
    }

    pub fn appointments() -> QueryKey {
        QueryKey::new(["appointments"])
    }

    pub fn appointments_for_pet(pet_id: &str) -> QueryKey {
        QueryKey::new(["appointments", "pet", pet_id])
    }

    pub fn vet(resource: &str) -> QueryKey {
        QueryKey::new(["vet", resource])
    }

    pub fn onboarding_status() -> QueryKey {
        vet("onboarding-status")
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
    stale_time: Duration,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.stale_time
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value if present and still fresh.
    pub async fn get_fresh<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|e| e.is_fresh())?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Cached value regardless of age.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        serde_json::from_value(entries.get(key)?.value.clone()).ok()
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn set<T: Serialize>(&self, key: QueryKey, value: &T, stale_time: Duration) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        self.entries.write().await.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                stale_time,
            },
        );
    }

    /// Rewrite a cached value in place, keeping its age. Returns `false`
    /// when the key is absent or does not hold a `T`.
    pub async fn update<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let Ok(mut value) = serde_json::from_value::<T>(entry.value.clone()) else {
            return false;
        };
        f(&mut value);
        match serde_json::to_value(&value) {
            Ok(json) => {
                entry.value = json;
                true
            }
            Err(_) => false,
        }
    }

    pub async fn remove(&self, key: &QueryKey) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop every entry under `prefix`. Returns how many were dropped.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(prefix = %prefix, dropped, "Invalidated queries");
        }
        dropped
    }

    /// Serve a fresh cached value or run `fetch` and cache its result.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(cached) = self.get_fresh(&key).await {
            return Ok(cached);
        }
        let value = fetch().await?;
        self.set(key, &value, stale_time).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn prefix_invalidation() {
        let cache = QueryCache::new();
        cache.set(keys::pet_lists(), &vec![1, 2], PETS_STALE_TIME).await;
        cache.set(keys::pet_detail("a"), &1, PETS_STALE_TIME).await;
        cache.set(keys::appointments(), &0, Duration::ZERO).await;

        assert_eq!(cache.invalidate(&keys::pets()).await, 2);
        assert!(!cache.contains(&keys::pet_detail("a")).await);
        assert!(cache.contains(&keys::appointments()).await);
    }

    #[tokio::test]
    async fn zero_stale_time_is_never_fresh() {
        let cache = QueryCache::new();
        cache.set(keys::appointments(), &vec!["x"], Duration::ZERO).await;
        assert!(cache.get_fresh::<Vec<String>>(&keys::appointments()).await.is_none());
        assert_eq!(
            cache.get::<Vec<String>>(&keys::appointments()).await,
            Some(vec!["x".to_string()])
        );
    }

    #[tokio::test]
    async fn fetch_uses_fresh_entries() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let value: u32 = cache
                .fetch(keys::pet_lists(), PETS_STALE_TIME, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_in_place() {
        let cache = QueryCache::new();
        cache.set(keys::pet_lists(), &vec![1, 2, 3], PETS_STALE_TIME).await;
        assert!(cache.update(&keys::pet_lists(), |v: &mut Vec<u32>| v.retain(|n| *n != 2)).await);
        assert_eq!(cache.get::<Vec<u32>>(&keys::pet_lists()).await, Some(vec![1, 3]));
        assert!(!cache.update(&keys::pet_detail("zz"), |_: &mut u32| {}).await);
    }

    #[test]
    fn key_display() {
        assert_eq!(keys::pet_detail("42").to_string(), "pets/detail/42");
        assert!(keys::appointments_for_pet("9").starts_with(&keys::appointments()));
    }
}

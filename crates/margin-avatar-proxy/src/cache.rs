//! URL-keyed response cache
//!
//! `EdgeCache` is the narrow contract the handler relies on: whole values
//! keyed by request URL, replaced wholesale, no read-your-writes promise.
//! `MemoryEdgeCache` backs it in-process with moka, expiring each entry
//! after the `max-age` it was served with.

use crate::types::{AvatarResponse, CacheStats};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

#[async_trait]
pub trait EdgeCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<AvatarResponse>;

    /// Store a response. Responses without a freshness hint are ignored.
    async fn put(&self, key: String, response: AvatarResponse);

    async fn stats(&self) -> CacheStats;
}

struct MaxAgeExpiry;

impl Expiry<String, AvatarResponse> for MaxAgeExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &AvatarResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.max_age
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &AvatarResponse,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.max_age
    }
}

/// In-process cache bounded by total body size
pub struct MemoryEdgeCache {
    entries: Cache<String, AvatarResponse>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryEdgeCache {
    /// Create a cache holding at most `max_size` bytes of response bodies
    pub fn new(max_size: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_size)
            .weigher(|_key: &String, value: &AvatarResponse| -> u32 {
                value.body.len().try_into().unwrap_or(u32::MAX)
            })
            .expire_after(MaxAgeExpiry)
            .build();

        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl EdgeCache for MemoryEdgeCache {
    async fn get(&self, key: &str) -> Option<AvatarResponse> {
        match self.entries.get(key).await {
            Some(response) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Cache hit");
                Some(response)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn put(&self, key: String, response: AvatarResponse) {
        if !response.is_cacheable() {
            debug!(key = %key, "Skipping uncacheable response");
            return;
        }
        debug!(key = %key, size = response.body.len(), "Caching response");
        self.entries.insert(key, response).await;
    }

    async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        CacheStats {
            entries: self.entries.entry_count(),
            total_size: self.entries.weighted_size(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

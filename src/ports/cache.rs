//! Cache Port
//!
//! Key-value cache with TTL for derived, re-computable facts. Cache
//! failures never propagate: a miss and a transient failure look the
//! same to callers. Concurrent writes to one key are last-write-wins.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache abstraction: values are JSON strings
#[async_trait]
pub trait CachePort: Send + Sync {
    /// `None` on miss, expiry, or transient failure
    async fn get(&self, key: &str) -> Option<String>;

    /// Store with a TTL; errors are swallowed
    async fn set(&self, key: &str, value: String, ttl: Duration);
}

/// Cache key for a symbol's per-day derived snapshot
pub fn daily_key(symbol: &str, day: NaiveDate) -> String {
    format!("scan:{}:{}", symbol, day)
}

/// Cache entry with TTL tracking
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_valid(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// In-process cache implementation
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries
    pub async fn cleanup(&self) {
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.is_valid());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_valid())
            .map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

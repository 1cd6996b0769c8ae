// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Entity snapshot cache.
//!
//! The cache is a disposable accelerator in front of the relational store.
//! Backends implement [`Cache`]; a miss is `Ok(None)`, while a backend
//! failure is an `Err` so that callers never mistake an outage for a miss.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;

use crate::models::{MerchantId, ProductId};

/// Cache backend failures. A missing key is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),

    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed, TTL-expiring byte cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a live entry. Returns `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store an entry that expires `ttl` after insertion.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache key namespaces.
pub mod keys {
    use super::{MerchantId, ProductId};

    pub fn merchant_by_id(id: MerchantId) -> String {
        format!("merchant_{id}")
    }

    pub fn merchant_by_email(email: &str) -> String {
        format!("merchant_{email}")
    }

    pub fn product_by_id(id: ProductId) -> String {
        format!("product_{id}")
    }
}

/// Cached entry: serialized snapshot + expiry deadline.
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process LRU cache with per-entry TTL.
pub struct LruTtlCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
}

impl LruTtlCache {
    /// Create a new cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, CacheEntry>>, CacheError> {
        self.cache
            .lock()
            .map_err(|_| CacheError::Backend("cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl Cache for LruTtlCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut cache = self.lock()?;
        if let Some(entry) = cache.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
            // Expired, drop it
            cache.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut cache = self.lock()?;
        cache.put(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.pop(key);
        Ok(())
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cache-aside repositories over the relational store.
//!
//! Each repository owns a [`SqlStore`](super::SqlStore) handle and a shared
//! [`Cache`]. Reads consult the cache first and populate it from the store on
//! a miss. Writes go to the store, then drop the affected cache entries, then
//! re-read the entity so callers always see store-assigned fields.
//!
//! Every call that touches the store or the cache runs under the caller's
//! [`CancellationToken`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;

use super::cache::{Cache, CacheError};
use super::sql::StoreError;
use crate::error::Entity;

pub mod merchants;
pub mod products;

pub use merchants::MerchantRepository;
pub use products::ProductRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("operation cancelled")]
    Cancelled,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Run `fut` unless `cancel` fires first.
async fn guarded<T, E, F>(cancel: &CancellationToken, fut: F) -> RepositoryResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<RepositoryError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        result = fut => result.map_err(Into::into),
    }
}

/// JSON snapshot access to the shared cache.
#[derive(Clone)]
struct CacheAside {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CacheAside {
    fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Look up a snapshot. An entry that no longer decodes is evicted and
    /// reported as a miss.
    async fn read<T: DeserializeOwned>(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<T>> {
        let Some(bytes) = guarded(cancel, self.cache.get(key)).await? else {
            tracing::debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Evicting undecodable cache entry");
                guarded(cancel, self.cache.delete(key)).await?;
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        cancel: &CancellationToken,
    ) -> RepositoryResult<()> {
        let bytes = serde_json::to_vec(value).map_err(CacheError::from)?;
        guarded(cancel, self.cache.set(key, bytes, self.ttl)).await
    }

    async fn invalidate(&self, keys: &[String], cancel: &CancellationToken) -> RepositoryResult<()> {
        for key in keys {
            guarded(cancel, self.cache.delete(key)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::storage::cache::LruTtlCache;
    use crate::storage::sql::SqlStore;

    pub const TTL: Duration = Duration::from_secs(300);

    pub async fn store() -> SqlStore {
        let store = SqlStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    pub fn lru() -> Arc<LruTtlCache> {
        Arc::new(LruTtlCache::new(64))
    }

    /// Cache whose backend can be switched off mid-test.
    pub struct FlakyCache {
        inner: LruTtlCache,
        down: AtomicBool,
    }

    impl FlakyCache {
        pub fn new() -> Self {
            Self {
                inner: LruTtlCache::new(64),
                down: AtomicBool::new(false),
            }
        }

        pub fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), CacheError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(CacheError::Backend("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for FlakyCache {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
            self.check()?;
            self.inner.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.check()?;
            self.inner.delete(key).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn guarded_returns_cancelled_when_token_fired() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: RepositoryResult<()> =
            guarded(&cancel, async { Ok::<_, CacheError>(()) }).await;
        assert!(matches!(result, Err(RepositoryError::Cancelled)));
    }

    #[tokio::test]
    async fn guarded_aborts_pending_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: RepositoryResult<()> = guarded(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, CacheError>(())
        })
        .await;
        assert!(matches!(result, Err(RepositoryError::Cancelled)));
    }

    #[tokio::test]
    async fn undecodable_entry_is_evicted_as_miss() {
        let cache = lru();
        let aside = CacheAside::new(cache.clone(), TTL);
        let cancel = CancellationToken::new();
        cache.set("merchant_1", b"{not json".to_vec(), TTL).await.unwrap();

        let value: Option<crate::models::Merchant> =
            aside.read("merchant_1", &cancel).await.unwrap();

        assert!(value.is_none());
        assert!(cache.get("merchant_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn backend_failure_is_not_a_miss() {
        let cache = Arc::new(FlakyCache::new());
        cache.set_down(true);
        let aside = CacheAside::new(cache, TTL);

        let result: RepositoryResult<Option<crate::models::Merchant>> =
            aside.read("merchant_1", &CancellationToken::new()).await;
        assert!(matches!(result, Err(RepositoryError::Cache(_))));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::CatalogConfig;
use crate::service::{AuthService, MerchantService, ProductService};
use crate::storage::{
    Cache, CacheError, LruTtlCache, MerchantRepository, ProductRepository, SqlStore, StoreError,
};

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CatalogConfig>,
    pub codec: TokenCodec,
    pub merchants: MerchantService,
    pub products: ProductService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the services over an already-migrated store and a cache backend.
    pub fn new(config: CatalogConfig, store: SqlStore, cache: Arc<dyn Cache>) -> Self {
        let config = Arc::new(config);
        let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.jwt_ttl);

        let merchant_repo = MerchantRepository::new(store.clone(), cache.clone(), config.cache_ttl);
        let product_repo = ProductRepository::new(store, cache, config.cache_ttl);

        Self {
            merchants: MerchantService::new(merchant_repo.clone(), config.clone()),
            products: ProductService::new(product_repo, config.clone()),
            auth: AuthService::new(merchant_repo, codec.clone()),
            codec,
            config,
        }
    }

    /// Connect to the configured store, create the schema, and pick the cache
    /// backend.
    ///
    /// A configured `REDIS_URL` is never ignored: if the shared cache cannot
    /// be used, startup fails instead of running instances with private caches.
    pub async fn connect(config: CatalogConfig) -> Result<Self, StartupError> {
        let store = SqlStore::connect(&config.database_url, config.database_max_connections).await?;
        store.migrate().await?;

        let cache = cache_backend(&config).await?;
        Ok(Self::new(config, store, cache))
    }
}

/// Failures while bringing up [`AppState`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("redis cache unavailable: {0}")]
    Cache(#[from] CacheError),

    #[error("REDIS_URL is set but the redis-cache feature is not enabled")]
    RedisNotCompiled,
}

#[cfg(feature = "redis-cache")]
async fn cache_backend(config: &CatalogConfig) -> Result<Arc<dyn Cache>, StartupError> {
    if let Some(url) = config.redis_url.as_deref() {
        let cache = crate::storage::RedisCache::connect(url).await?;
        tracing::info!("Using Redis entity cache");
        return Ok(Arc::new(cache));
    }
    Ok(Arc::new(LruTtlCache::new(config.cache_capacity)))
}

#[cfg(not(feature = "redis-cache"))]
async fn cache_backend(config: &CatalogConfig) -> Result<Arc<dyn Cache>, StartupError> {
    if config.redis_url.is_some() {
        return Err(StartupError::RedisNotCompiled);
    }
    Ok(Arc::new(LruTtlCache::new(config.cache_capacity)))
}

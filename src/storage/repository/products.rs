// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product repository.
//!
//! Products are cached under `product_<id>` together with the owning
//! merchant as read by the same joined query. A merchant change does not
//! touch cached products; their embedded merchant ages out with the TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{guarded, CacheAside, RepositoryError, RepositoryResult};
use crate::error::Entity;
use crate::models::{NewProduct, Product, ProductId};
use crate::storage::cache::{keys, Cache};
use crate::storage::sql::{SqlStore, StoreError};

#[derive(Clone)]
pub struct ProductRepository {
    store: SqlStore,
    cache: CacheAside,
}

impl ProductRepository {
    pub fn new(store: SqlStore, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            store,
            cache: CacheAside::new(cache, ttl),
        }
    }

    /// Insert a product and return it as stored, owner included.
    ///
    /// An owner id with no merchant row is reported as a missing merchant.
    pub async fn create(
        &self,
        product: &NewProduct,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Product> {
        let id = guarded(cancel, self.store.insert_product(product))
            .await
            .map_err(|e| match e {
                RepositoryError::Store(StoreError::ForeignKeyViolation(_)) => {
                    RepositoryError::NotFound(Entity::Merchant)
                }
                other => other,
            })?;

        tracing::info!(product_id = %id, merchant_id = %product.merchant_id, "Product created");
        self.get(id, cancel).await
    }

    pub async fn get(&self, id: ProductId, cancel: &CancellationToken) -> RepositoryResult<Product> {
        let key = keys::product_by_id(id);
        if let Some(product) = self.cache.read(&key, cancel).await? {
            return Ok(product);
        }

        let product = guarded(cancel, self.store.find_product(id))
            .await?
            .ok_or(RepositoryError::NotFound(Entity::Product))?;

        self.cache.write(&key, &product, cancel).await?;
        Ok(product)
    }

    /// Page through products by name, owners joined. Never cached.
    pub async fn list(
        &self,
        limit: u32,
        offset: u32,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Product>> {
        guarded(cancel, self.store.list_products(limit, offset, name)).await
    }

    /// Persist `product`'s name, price and update time.
    pub async fn update(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Product> {
        let updated_at = product.updated_at.unwrap_or_else(chrono::Utc::now);
        let affected = guarded(
            cancel,
            self.store
                .update_product(product.id, &product.name, product.price, updated_at),
        )
        .await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(Entity::Product));
        }

        self.cache
            .invalidate(&[keys::product_by_id(product.id)], cancel)
            .await?;

        tracing::info!(product_id = %product.id, "Product updated");
        self.get(product.id, cancel).await
    }

    pub async fn delete(&self, id: ProductId, cancel: &CancellationToken) -> RepositoryResult<()> {
        let affected = guarded(cancel, self.store.delete_product(id)).await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(Entity::Product));
        }

        self.cache.invalidate(&[keys::product_by_id(id)], cancel).await?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

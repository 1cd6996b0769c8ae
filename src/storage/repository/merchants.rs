// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Merchant repository.
//!
//! Merchants are cached under two keys: `merchant_<id>` and
//! `merchant_<email>`. Writes drop the id key and the email keys for both
//! the email held before the write and the email held after it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::{guarded, CacheAside, RepositoryError, RepositoryResult};
use crate::error::Entity;
use crate::models::{Merchant, MerchantId, NewMerchant};
use crate::storage::cache::{keys, Cache};
use crate::storage::sql::{SqlStore, StoreError};

const DUPLICATE_EMAIL: &str = "email already registered";

#[derive(Clone)]
pub struct MerchantRepository {
    store: SqlStore,
    cache: CacheAside,
}

impl MerchantRepository {
    pub fn new(store: SqlStore, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            store,
            cache: CacheAside::new(cache, ttl),
        }
    }

    /// Insert a merchant and return it as stored.
    pub async fn create(
        &self,
        merchant: &NewMerchant,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        let id = guarded(cancel, self.store.insert_merchant(merchant))
            .await
            .map_err(map_write_error)?;

        tracing::info!(merchant_id = %id, "Merchant created");
        self.get(id, cancel).await
    }

    pub async fn get(&self, id: MerchantId, cancel: &CancellationToken) -> RepositoryResult<Merchant> {
        let key = keys::merchant_by_id(id);
        if let Some(merchant) = self.cache.read(&key, cancel).await? {
            return Ok(merchant);
        }

        let merchant = guarded(cancel, self.store.find_merchant(id))
            .await?
            .ok_or(RepositoryError::NotFound(Entity::Merchant))?;

        self.cache.write(&key, &merchant, cancel).await?;
        Ok(merchant)
    }

    pub async fn get_by_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        let key = keys::merchant_by_email(email);
        if let Some(merchant) = self.cache.read(&key, cancel).await? {
            return Ok(merchant);
        }

        let merchant = guarded(cancel, self.store.find_merchant_by_email(email))
            .await?
            .ok_or(RepositoryError::NotFound(Entity::Merchant))?;

        self.cache.write(&key, &merchant, cancel).await?;
        Ok(merchant)
    }

    /// Page through merchants by name. Never cached.
    pub async fn list(
        &self,
        limit: u32,
        offset: u32,
        name: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Merchant>> {
        guarded(cancel, self.store.list_merchants(limit, offset, name)).await
    }

    /// Set a merchant's name and email. The password column is not written.
    pub async fn update_profile(
        &self,
        id: MerchantId,
        name: &str,
        email: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        let previous = self.find_in_store(id, cancel).await?;

        let affected = guarded(
            cancel,
            self.store
                .update_merchant_profile(id, name, email, Utc::now()),
        )
        .await
        .map_err(map_write_error)?;

        self.after_update(id, affected, &previous.email, email, cancel)
            .await
    }

    /// Replace a merchant's password hash. Name and email are not written.
    pub async fn update_password(
        &self,
        id: MerchantId,
        password_hash: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        let previous = self.find_in_store(id, cancel).await?;

        let affected = guarded(
            cancel,
            self.store
                .update_merchant_password(id, password_hash, Utc::now()),
        )
        .await?;

        self.after_update(id, affected, &previous.email, &previous.email, cancel)
            .await
    }

    pub async fn delete(&self, id: MerchantId, cancel: &CancellationToken) -> RepositoryResult<()> {
        let previous = self.find_in_store(id, cancel).await?;

        let affected = guarded(cancel, self.store.delete_merchant(id))
            .await
            .map_err(|e| match e {
                RepositoryError::Store(StoreError::ForeignKeyViolation(_)) => {
                    RepositoryError::Conflict("merchant still owns products".to_string())
                }
                other => other,
            })?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(Entity::Merchant));
        }

        self.cache
            .invalidate(&stale_keys(id, &previous.email, &previous.email), cancel)
            .await?;

        tracing::info!(merchant_id = %id, "Merchant deleted");
        Ok(())
    }

    /// Current row straight from the store, bypassing the cache.
    async fn find_in_store(
        &self,
        id: MerchantId,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        guarded(cancel, self.store.find_merchant(id))
            .await?
            .ok_or(RepositoryError::NotFound(Entity::Merchant))
    }

    async fn after_update(
        &self,
        id: MerchantId,
        affected: u64,
        old_email: &str,
        new_email: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Merchant> {
        if affected == 0 {
            return Err(RepositoryError::NotFound(Entity::Merchant));
        }

        self.cache
            .invalidate(&stale_keys(id, old_email, new_email), cancel)
            .await?;

        tracing::info!(merchant_id = %id, "Merchant updated");
        self.get(id, cancel).await
    }
}

fn map_write_error(e: RepositoryError) -> RepositoryError {
    match e {
        RepositoryError::Store(StoreError::UniqueViolation(_)) => {
            RepositoryError::Conflict(DUPLICATE_EMAIL.to_string())
        }
        other => other,
    }
}

fn stale_keys(id: MerchantId, old_email: &str, new_email: &str) -> Vec<String> {
    let mut keys = vec![keys::merchant_by_id(id), keys::merchant_by_email(old_email)];
    if old_email != new_email {
        keys.push(keys::merchant_by_email(new_email));
    }
    keys
}

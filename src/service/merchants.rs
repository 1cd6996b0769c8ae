// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Merchant account management.
//!
//! A merchant may only change or delete itself.

use std::sync::Arc;

use chrono::Utc;

use super::RequestContext;
use crate::auth::{hash_password, require_owner, verify_password};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateMerchantRequest, ListQuery, MerchantId, MerchantResponse, NewMerchant,
    UpdateMerchantRequest, UpdatePasswordRequest,
};
use crate::storage::{MerchantRepository, RepositoryError};

const EMAIL_TAKEN: &str = "email already registered";

#[derive(Clone)]
pub struct MerchantService {
    merchants: MerchantRepository,
    config: Arc<CatalogConfig>,
}

impl MerchantService {
    pub fn new(merchants: MerchantRepository, config: Arc<CatalogConfig>) -> Self {
        Self { merchants, config }
    }

    /// Register a new merchant.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateMerchantRequest,
    ) -> CatalogResult<MerchantResponse> {
        self.ensure_email_free(ctx, &request.email, None).await?;

        let password_hash = hash_password(&request.password).await.map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            CatalogError::Infrastructure
        })?;

        let merchant = self
            .merchants
            .create(
                &NewMerchant {
                    name: request.name,
                    email: request.email,
                    password_hash,
                    created_at: Utc::now(),
                },
                &ctx.cancel,
            )
            .await?;

        Ok(merchant.into())
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> CatalogResult<Vec<MerchantResponse>> {
        let limit = self.config.page_size(query.limit);
        let merchants = self
            .merchants
            .list(limit, query.offset, &query.name, &ctx.cancel)
            .await?;

        Ok(merchants.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, ctx: &RequestContext, id: MerchantId) -> CatalogResult<MerchantResponse> {
        Ok(self.merchants.get(id, &ctx.cancel).await?.into())
    }

    /// Change the caller's own name and email.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: MerchantId,
        request: UpdateMerchantRequest,
    ) -> CatalogResult<MerchantResponse> {
        require_owner(&ctx.identity, id)?;

        let merchant = self.merchants.get(id, &ctx.cancel).await?;
        if merchant.email != request.email {
            self.ensure_email_free(ctx, &request.email, Some(id)).await?;
        }

        let updated = self
            .merchants
            .update_profile(id, &request.name, &request.email, &ctx.cancel)
            .await?;
        Ok(updated.into())
    }

    /// Replace the caller's password after checking the current one.
    pub async fn update_password(
        &self,
        ctx: &RequestContext,
        id: MerchantId,
        request: UpdatePasswordRequest,
    ) -> CatalogResult<MerchantResponse> {
        require_owner(&ctx.identity, id)?;

        let merchant = self.merchants.get(id, &ctx.cancel).await?;
        if !verify_password(&request.old_password, &merchant.password_hash).await {
            return Err(CatalogError::WrongCredential);
        }

        let password_hash = hash_password(&request.new_password).await.map_err(|e| {
            tracing::error!(merchant_id = %id, error = %e, "Password hashing failed");
            CatalogError::Infrastructure
        })?;

        let updated = self
            .merchants
            .update_password(id, &password_hash, &ctx.cancel)
            .await?;
        Ok(updated.into())
    }

    pub async fn delete(&self, ctx: &RequestContext, id: MerchantId) -> CatalogResult<()> {
        require_owner(&ctx.identity, id)?;
        self.merchants.delete(id, &ctx.cancel).await?;
        Ok(())
    }

    /// Fail with `Conflict` if `email` belongs to a merchant other than `owner`.
    async fn ensure_email_free(
        &self,
        ctx: &RequestContext,
        email: &str,
        owner: Option<MerchantId>,
    ) -> CatalogResult<()> {
        match self.merchants.get_by_email(email, &ctx.cancel).await {
            Ok(existing) if Some(existing.id) != owner => {
                Err(CatalogError::Conflict(EMAIL_TAKEN.to_string()))
            }
            Ok(_) | Err(RepositoryError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::super::test_support::{state, state_with_cache};
    use super::*;
    use crate::auth::IdentityContext;
    use crate::error::Entity;
    use crate::models::LoginRequest;
    use crate::storage::cache::keys;
    use crate::storage::Cache;

    fn ava() -> CreateMerchantRequest {
        CreateMerchantRequest {
            name: "Ava".to_string(),
            email: "ava@x.com".to_string(),
            password: "longenough1".to_string(),
        }
    }

    fn as_merchant(id: MerchantId) -> RequestContext {
        RequestContext::new(IdentityContext::authenticated(id))
    }

    #[tokio::test]
    async fn create_and_get() {
        let state = state().await;
        let anon = RequestContext::anonymous();

        let created = state.merchants.create(&anon, ava()).await.unwrap();
        assert_eq!(created.name, "Ava");
        assert_eq!(state.merchants.get(&anon, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn cached_merchant_holds_only_the_hash() {
        let (state, cache) = state_with_cache().await;
        let anon = RequestContext::anonymous();
        let ava = state.merchants.create(&anon, ava()).await.unwrap();
        state.merchants.get(&anon, ava.id).await.unwrap();
        state
            .auth
            .login(
                &anon,
                LoginRequest {
                    email: "ava@x.com".to_string(),
                    password: "longenough1".to_string(),
                },
            )
            .await
            .unwrap();

        for key in [keys::merchant_by_id(ava.id), keys::merchant_by_email("ava@x.com")] {
            let bytes = cache.get(&key).await.unwrap().expect("entry cached");
            let text = String::from_utf8(bytes).unwrap();
            assert!(!text.contains("longenough1"), "{key} leaks the password");
            assert!(text.contains("$argon2id$"), "{key} lacks the hash");
        }
    }

    #[tokio::test]
    async fn cancelled_parent_token_cancels_request() {
        let state = state().await;
        let ava = state
            .merchants
            .create(&RequestContext::anonymous(), ava())
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let ctx = RequestContext::with_cancel(
            IdentityContext::authenticated(ava.id),
            shutdown.child_token(),
        );
        assert!(state.merchants.get(&ctx, ava.id).await.is_ok());

        shutdown.cancel();
        assert_eq!(
            state.merchants.get(&ctx, ava.id).await,
            Err(CatalogError::Cancelled)
        );
        assert_eq!(
            state
                .merchants
                .update(
                    &ctx,
                    ava.id,
                    UpdateMerchantRequest {
                        name: "Ava B".to_string(),
                        email: "ava@x.com".to_string(),
                    },
                )
                .await,
            Err(CatalogError::Cancelled)
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        state.merchants.create(&anon, ava()).await.unwrap();

        let result = state.merchants.create(&anon, ava()).await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn only_self_may_update() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        let ava = state.merchants.create(&anon, ava()).await.unwrap();
        let request = UpdateMerchantRequest {
            name: "Ava B".to_string(),
            email: "ava@x.com".to_string(),
        };

        for ctx in [anon, as_merchant(ava.id + 1)] {
            let result = state.merchants.update(&ctx, ava.id, request.clone()).await;
            assert_eq!(result, Err(CatalogError::Unauthorized));
        }

        let updated = state
            .merchants
            .update(&as_merchant(ava.id), ava.id, request)
            .await
            .unwrap();
        assert_eq!(updated.name, "Ava B");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_to_someone_elses_email_is_conflict() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        state.merchants.create(&anon, ava()).await.unwrap();
        let bo = state
            .merchants
            .create(
                &anon,
                CreateMerchantRequest {
                    name: "Bo".to_string(),
                    email: "bo@x.com".to_string(),
                    password: "longenough1".to_string(),
                },
            )
            .await
            .unwrap();

        let result = state
            .merchants
            .update(
                &as_merchant(bo.id),
                bo.id,
                UpdateMerchantRequest {
                    name: "Bo".to_string(),
                    email: "ava@x.com".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn email_change_retires_old_login() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        let ava = state.merchants.create(&anon, ava()).await.unwrap();
        // Warm the by-email key through a login
        state
            .auth
            .login(
                &anon,
                LoginRequest {
                    email: "ava@x.com".to_string(),
                    password: "longenough1".to_string(),
                },
            )
            .await
            .unwrap();

        state
            .merchants
            .update(
                &as_merchant(ava.id),
                ava.id,
                UpdateMerchantRequest {
                    name: "Ava".to_string(),
                    email: "ava@y.com".to_string(),
                },
            )
            .await
            .unwrap();

        let old = state
            .auth
            .login(
                &anon,
                LoginRequest {
                    email: "ava@x.com".to_string(),
                    password: "longenough1".to_string(),
                },
            )
            .await;
        assert_eq!(old, Err(CatalogError::WrongCredential));

        let new = state
            .auth
            .login(
                &anon,
                LoginRequest {
                    email: "ava@y.com".to_string(),
                    password: "longenough1".to_string(),
                },
            )
            .await;
        assert!(new.is_ok());
    }

    #[tokio::test]
    async fn password_change_is_visible_to_login() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        let ava = state.merchants.create(&anon, ava()).await.unwrap();
        let login = |password: &str| LoginRequest {
            email: "ava@x.com".to_string(),
            password: password.to_string(),
        };
        state.auth.login(&anon, login("longenough1")).await.unwrap();

        let wrong_old = state
            .merchants
            .update_password(
                &as_merchant(ava.id),
                ava.id,
                UpdatePasswordRequest {
                    old_password: "not-it".to_string(),
                    new_password: "brandnew22".to_string(),
                },
            )
            .await;
        assert_eq!(wrong_old, Err(CatalogError::WrongCredential));

        state
            .merchants
            .update_password(
                &as_merchant(ava.id),
                ava.id,
                UpdatePasswordRequest {
                    old_password: "longenough1".to_string(),
                    new_password: "brandnew22".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            state.auth.login(&anon, login("longenough1")).await,
            Err(CatalogError::WrongCredential)
        );
        assert!(state.auth.login(&anon, login("brandnew22")).await.is_ok());
    }

    #[tokio::test]
    async fn delete_self_then_not_found() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        let ava = state.merchants.create(&anon, ava()).await.unwrap();

        assert_eq!(
            state.merchants.delete(&anon, ava.id).await,
            Err(CatalogError::Unauthorized)
        );

        let owner = as_merchant(ava.id);
        state.merchants.delete(&owner, ava.id).await.unwrap();
        assert_eq!(
            state.merchants.get(&anon, ava.id).await,
            Err(CatalogError::NotFound(Entity::Merchant))
        );
        assert_eq!(
            state.merchants.delete(&owner, ava.id).await,
            Err(CatalogError::NotFound(Entity::Merchant))
        );
    }

    #[tokio::test]
    async fn list_uses_default_page_size() {
        let state = state().await;
        let anon = RequestContext::anonymous();
        for i in 0..3 {
            state
                .merchants
                .create(
                    &anon,
                    CreateMerchantRequest {
                        name: format!("Shop {i}"),
                        email: format!("shop{i}@x.com"),
                        password: "longenough1".to_string(),
                    },
                )
                .await
                .unwrap();
        }

        // Test config sets the default page size to 2
        let page = state.merchants.list(&anon, &ListQuery::default()).await.unwrap();
        assert_eq!(page.len(), 2);

        let rest = state
            .merchants
            .list(
                &anon,
                &ListQuery {
                    limit: Some(10),
                    offset: 2,
                    name: "Shop".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "Shop 2");
    }
}

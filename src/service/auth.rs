// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential login.

use super::RequestContext;
use crate::auth::{verify_password, TokenCodec};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{LoginRequest, TokenResponse};
use crate::storage::{MerchantRepository, RepositoryError};

#[derive(Clone)]
pub struct AuthService {
    merchants: MerchantRepository,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(merchants: MerchantRepository, codec: TokenCodec) -> Self {
        Self { merchants, codec }
    }

    /// Exchange an email and password for a bearer token.
    ///
    /// An unknown email and a wrong password fail the same way.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        request: LoginRequest,
    ) -> CatalogResult<TokenResponse> {
        let merchant = match self.merchants.get_by_email(&request.email, &ctx.cancel).await {
            Ok(merchant) => merchant,
            Err(RepositoryError::NotFound(_)) => return Err(CatalogError::WrongCredential),
            Err(e) => return Err(e.into()),
        };

        if !verify_password(&request.password, &merchant.password_hash).await {
            tracing::debug!(merchant_id = %merchant.id, "Login rejected");
            return Err(CatalogError::WrongCredential);
        }

        let token = self.codec.issue(merchant.id).map_err(|e| {
            tracing::error!(merchant_id = %merchant.id, error = %e, "Token signing failed");
            CatalogError::Infrastructure
        })?;

        Ok(TokenResponse { token })
    }
}

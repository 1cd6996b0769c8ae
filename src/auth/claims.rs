// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MerchantId;

/// Claims carried by a catalog bearer token.
///
/// `sub` is the merchant id rendered as a decimal string, as registered
/// JWT claims require a string subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (merchant id)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for `merchant_id`, issued at `issued_at` and valid for `ttl_secs`.
    pub fn new(merchant_id: MerchantId, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: merchant_id.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }

    /// Parse the subject back into a merchant id.
    pub fn merchant_id(&self) -> Option<MerchantId> {
        self.sub.parse().ok()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Catalog Data Models
//!
//! Entity snapshots stored in the relational store and the cache, plus the
//! request and response shapes exchanged with the transport layer.
//!
//! ## Model Categories
//!
//! - **Entities**: [`Merchant`] and [`Product`], full snapshots as read from
//!   the store. These are what the cache holds.
//! - **Requests**: already-validated inputs handed to the services.
//! - **Responses**: client-facing views. A merchant's password hash never
//!   appears in any of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned merchant identity.
pub type MerchantId = i64;

/// Store-assigned product identity.
pub type ProductId = i64;

// =============================================================================
// Entities
// =============================================================================

/// A seller account.
///
/// `password_hash` is an Argon2id PHC string. The struct is serialized into
/// the cache whole, so it must never hold a plaintext credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product listed by a merchant.
///
/// `merchant` is the owning merchant as it was when this row was last read
/// from the store. It is not refreshed when the merchant changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub merchant_id: MerchantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merchant: Merchant,
}

/// Fields for inserting a merchant row.
#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a product row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub merchant_id: MerchantId,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMerchantRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMerchantRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: f64,
}

/// Paging and name filter for list endpoints.
///
/// `limit` falls back to the configured page size when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub name: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Client-facing merchant view (no credential).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantResponse {
    pub id: MerchantId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Merchant> for MerchantResponse {
    fn from(merchant: Merchant) -> Self {
        Self {
            id: merchant.id,
            name: merchant.name,
            email: merchant.email,
            created_at: merchant.created_at,
            updated_at: merchant.updated_at,
        }
    }
}

/// Client-facing product view with the embedded owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merchant_id: MerchantId,
    pub merchant: MerchantResponse,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            created_at: product.created_at,
            updated_at: product.updated_at,
            merchant_id: product.merchant_id,
            merchant: product.merchant.into(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

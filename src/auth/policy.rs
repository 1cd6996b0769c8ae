// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership checks for catalog mutations.
//!
//! Every mutation is gated on the caller owning the target: a merchant may
//! only manage itself, and a product may only be changed by the merchant
//! that owns it. There is no administrative override.

use super::IdentityContext;
use crate::models::{Merchant, MerchantId, Product};

/// Denial returned by the checked helpers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("caller is not permitted to perform this action")]
pub struct NotPermitted;

/// Trait for resources that have an owning merchant.
pub trait OwnedResource {
    fn owner_id(&self) -> MerchantId;
}

impl OwnedResource for Merchant {
    fn owner_id(&self) -> MerchantId {
        self.id
    }
}

impl OwnedResource for Product {
    fn owner_id(&self) -> MerchantId {
        self.merchant_id
    }
}

/// True only when the caller is authenticated as `target_owner_id`.
pub fn is_owner(identity: &IdentityContext, target_owner_id: MerchantId) -> bool {
    identity.merchant_id() == Some(target_owner_id)
}

/// Require the caller to be authenticated as `target_owner_id`.
pub fn require_owner(
    identity: &IdentityContext,
    target_owner_id: MerchantId,
) -> Result<(), NotPermitted> {
    if is_owner(identity, target_owner_id) {
        Ok(())
    } else {
        Err(NotPermitted)
    }
}

/// Require the caller to own `resource`.
pub fn require_owner_of<R: OwnedResource>(
    identity: &IdentityContext,
    resource: &R,
) -> Result<(), NotPermitted> {
    require_owner(identity, resource.owner_id())
}

/// Require any authenticated caller and return its merchant id.
pub fn require_authenticated(identity: &IdentityContext) -> Result<MerchantId, NotPermitted> {
    identity.merchant_id().ok_or(NotPermitted)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request caller identity.

use crate::models::MerchantId;

/// The verified identity of the caller, or its absence.
///
/// Built once per request by the auth extractor and passed explicitly to
/// every service call that needs it. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityContext {
    merchant_id: Option<MerchantId>,
}

impl IdentityContext {
    /// A caller that presented no valid token.
    pub const fn anonymous() -> Self {
        Self { merchant_id: None }
    }

    /// A caller authenticated as `merchant_id`.
    pub const fn authenticated(merchant_id: MerchantId) -> Self {
        Self {
            merchant_id: Some(merchant_id),
        }
    }

    pub const fn merchant_id(&self) -> Option<MerchantId> {
        self.merchant_id
    }

    pub const fn is_authenticated(&self) -> bool {
        self.merchant_id.is_some()
    }
}

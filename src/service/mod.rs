// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Catalog Services
//!
//! Use-case layer between the transport and the repositories. Every call
//! takes a [`RequestContext`] carrying the caller identity and the request's
//! cancellation token, applies the ownership policy, and returns either a
//! response struct or a [`CatalogError`].
//!
//! Store and cache failures are logged here and collapsed into
//! [`CatalogError::Infrastructure`]; nothing below this layer reaches the
//! client verbatim.

use tokio_util::sync::CancellationToken;

use crate::auth::{IdentityContext, NotPermitted};
use crate::error::CatalogError;
use crate::storage::RepositoryError;

pub mod auth;
pub mod merchants;
pub mod products;

pub use auth::AuthService;
pub use merchants::MerchantService;
pub use products::ProductService;

/// Per-request inputs shared by every service call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: IdentityContext,
    pub cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(identity: IdentityContext) -> Self {
        Self {
            identity,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(identity: IdentityContext, cancel: CancellationToken) -> Self {
        Self { identity, cancel }
    }

    pub fn anonymous() -> Self {
        Self::new(IdentityContext::anonymous())
    }
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(entity) => CatalogError::NotFound(entity),
            RepositoryError::Conflict(reason) => CatalogError::Conflict(reason),
            RepositoryError::Cancelled => CatalogError::Cancelled,
            RepositoryError::Store(e) => {
                tracing::error!(error = %e, "Store failure");
                CatalogError::Infrastructure
            }
            RepositoryError::Cache(e) => {
                tracing::error!(error = %e, "Cache failure");
                CatalogError::Infrastructure
            }
        }
    }
}

impl From<NotPermitted> for CatalogError {
    fn from(_: NotPermitted) -> Self {
        CatalogError::Unauthorized
    }
}

/// Reject prices the store cannot hold.
fn validate_price(price: f64) -> Result<(), CatalogError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::ValidationFailed(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Entity;
    use crate::storage::CacheError;

    #[test]
    fn infrastructure_errors_collapse() {
        let cache = CatalogError::from(RepositoryError::Cache(CacheError::Backend(
            "down".to_string(),
        )));
        assert_eq!(cache, CatalogError::Infrastructure);

        let store = CatalogError::from(RepositoryError::Store(
            sqlx::Error::PoolTimedOut.into(),
        ));
        assert_eq!(store, CatalogError::Infrastructure);
    }

    #[test]
    fn domain_errors_pass_through() {
        assert_eq!(
            CatalogError::from(RepositoryError::NotFound(Entity::Product)),
            CatalogError::NotFound(Entity::Product)
        );
        assert_eq!(
            CatalogError::from(RepositoryError::Cancelled),
            CatalogError::Cancelled
        );
        assert_eq!(CatalogError::from(NotPermitted), CatalogError::Unauthorized);
    }

    #[test]
    fn price_validation() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(12.5).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }
}

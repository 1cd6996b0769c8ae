// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors that turn a bearer token into an [`IdentityContext`].
//!
//! Use `Auth` where a caller must be signed in and `OptionalAuth` where
//! anonymous callers are allowed:
//!
//! ```rust,ignore
//! async fn update_product(
//!     Auth(identity): Auth,
//!     State(state): State<AppState>,
//!     Path(id): Path<ProductId>,
//!     Json(request): Json<UpdateProductRequest>,
//! ) -> Result<Json<ProductResponse>, ApiError> {
//!     let ctx = RequestContext::new(identity);
//!     Ok(Json(state.products.update(&ctx, id, request).await?))
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, IdentityContext, TokenCodec};
use crate::state::AppState;

/// Extractor for authenticated callers.
///
/// Rejects with [`AuthError`] when the header is missing or the token does
/// not verify.
pub struct Auth(pub IdentityContext);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts, &state.codec)?;
        Ok(Auth(identity))
    }
}

/// Optional authentication extractor.
///
/// Yields an anonymous identity instead of rejecting when no valid token is
/// present.
pub struct OptionalAuth(pub IdentityContext);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts, &state.codec) {
            Ok(identity) => Ok(OptionalAuth(identity)),
            Err(e) => {
                if e != AuthError::MissingAuthHeader {
                    tracing::debug!(error_code = e.error_code(), "Ignoring invalid bearer token");
                }
                Ok(OptionalAuth(IdentityContext::anonymous()))
            }
        }
    }
}

fn identity_from_parts(parts: &Parts, codec: &TokenCodec) -> Result<IdentityContext, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let merchant_id = codec.verify(token.trim())?;
    Ok(IdentityContext::authenticated(merchant_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{codec, state};
    use axum::http::Request;
    use chrono::Utc;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = state().await;
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_scheme() {
        let state = state().await;
        let mut parts = parts_with(Some("Basic YXZhOnB3"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let state = state().await;
        let token = codec().issue(42).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let Auth(identity) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(identity, IdentityContext::authenticated(42));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_expired_token() {
        let state = state().await;
        let stale = Utc::now() - chrono::Duration::days(30);
        let token = codec().issue_at(42, stale).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn optional_auth_is_anonymous_without_valid_token() {
        let state = state().await;

        for header in [None, Some("Bearer garbage")] {
            let mut parts = parts_with(header);
            let OptionalAuth(identity) =
                OptionalAuth::from_request_parts(&mut parts, &state).await.unwrap();
            assert!(!identity.is_authenticated());
        }
    }

    #[tokio::test]
    async fn optional_auth_keeps_valid_identity() {
        let state = state().await;
        let token = codec().issue(7).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let OptionalAuth(identity) = OptionalAuth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(identity.merchant_id(), Some(7));
    }
}

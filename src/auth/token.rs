// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}`. Verification pins the
//! algorithm: a token whose header names any other algorithm is rejected
//! even if it carries a valid MAC under the same secret.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::TokenClaims;
use crate::models::MerchantId;

/// The only accepted signing algorithm.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token verification and issuance failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token signing algorithm is not accepted")]
    AlgorithmMismatch,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Stateless HS256 token codec.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for `merchant_id`, valid from now for the configured TTL.
    pub fn issue(&self, merchant_id: MerchantId) -> Result<String, TokenError> {
        self.issue_at(merchant_id, Utc::now())
    }

    /// Issue a token as if the clock read `issued_at`.
    pub fn issue_at(
        &self,
        merchant_id: MerchantId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims::new(merchant_id, issued_at, ttl_secs);

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return the merchant id it was issued for.
    pub fn verify(&self, token: &str) -> Result<MerchantId, TokenError> {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
                _ => TokenError::Malformed,
            })?;

        token_data
            .claims
            .merchant_id()
            .ok_or(TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn verify_returns_issued_identity() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        assert_eq!(codec.verify(&token), Ok(42));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let token = codec.issue_at(42, issued_at).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenCodec::new(b"other-secret", Duration::from_secs(3600))
            .issue(42)
            .unwrap();
        assert_eq!(codec().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn other_algorithm_with_same_secret_is_rejected() {
        let claims = TokenClaims::new(42, Utc::now(), 3600);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(codec().verify(&token), Err(TokenError::AlgorithmMismatch));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(r#"{"sub":"42","iat":1,"exp":9999999999}"#);
        let token = format!("{header}.{claims}.");

        assert!(codec().verify(&token).is_err());
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"sub":"1","iat":1,"exp":9999999999}"#);
        parts[1] = &forged;

        assert_eq!(codec.verify(&parts.join(".")), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let claims = TokenClaims {
            sub: "user_123".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(codec().verify(&token), Err(TokenError::Malformed));
    }
}

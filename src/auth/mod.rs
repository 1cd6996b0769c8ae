// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token authentication and ownership policy for the catalog.
//!
//! ## Auth Flow
//!
//! 1. A merchant logs in with email and password
//!    ([`AuthService::login`](crate::service::AuthService::login))
//! 2. The service issues an HS256 JWT whose `sub` is the merchant id
//! 3. Clients send `Authorization: Bearer <token>`
//! 4. The [`Auth`] / [`OptionalAuth`] extractors verify the token and hand
//!    handlers an [`IdentityContext`]
//! 5. Services check ownership with the [`policy`] helpers
//!
//! ## Security
//!
//! - Only HS256 is accepted; the header algorithm is pinned
//! - No clock skew tolerance on expiry
//! - Passwords are stored as Argon2id hashes

pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod password;
pub mod policy;
pub mod token;

pub use claims::TokenClaims;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use identity::IdentityContext;
pub use password::{hash_password, verify_password, PasswordHashError};
pub use policy::{
    is_owner, require_authenticated, require_owner, require_owner_of, NotPermitted, OwnedResource,
};
pub use token::{TokenCodec, TokenError, TOKEN_ALGORITHM};

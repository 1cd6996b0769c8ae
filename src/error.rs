// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service-level error kinds and their HTTP mapping.
//!
//! | Kind               | Status |
//! |--------------------|--------|
//! | `NotFound`         | 404    |
//! | `Conflict`         | 409    |
//! | `Unauthorized`     | 401    |
//! | `WrongCredential`  | 401    |
//! | `ValidationFailed` | 400    |
//! | `Infrastructure`   | 500    |
//! | `Cancelled`        | 408    |

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Entity named in a not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Merchant,
    Product,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Merchant => write!(f, "merchant"),
            Entity::Product => write!(f, "product"),
        }
    }
}

/// Everything a service operation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not permitted")]
    Unauthorized,

    #[error("wrong credential")]
    WrongCredential,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Store or cache failure. Details are logged, never returned.
    #[error("internal error")]
    Infrastructure,

    #[error("request cancelled")]
    Cancelled,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        let status = match e {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Conflict(_) => StatusCode::CONFLICT,
            CatalogError::Unauthorized | CatalogError::WrongCredential => StatusCode::UNAUTHORIZED,
            CatalogError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CatalogError::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

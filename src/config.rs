// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! The configuration is read once from the environment (and an optional
//! `.env` file) into an immutable [`CatalogConfig`], which is then handed to
//! each component at construction time.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | SQLite connection string | `sqlite://catalog.db?mode=rwc` |
//! | `DATABASE_MAX_CONNECTIONS` | Store pool size | `10` |
//! | `JWT_SECRET` | HMAC secret for bearer tokens | Required |
//! | `JWT_TTL_SECS` | Token lifetime | `86400` |
//! | `CACHE_TTL_SECS` | Entity cache entry lifetime | `300` |
//! | `CACHE_CAPACITY` | In-process cache entry bound | `10000` |
//! | `REDIS_URL` | Shared cache (with `redis-cache` feature) | Unset (in-process cache) |
//! | `PAGINATION_LIMIT` | Default page size for list calls | `20` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable name for the store connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable name for the store pool size.
pub const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";
/// Environment variable name for the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
/// Environment variable name for the token lifetime in seconds.
pub const JWT_TTL_SECS_ENV: &str = "JWT_TTL_SECS";
/// Environment variable name for the cache entry lifetime in seconds.
pub const CACHE_TTL_SECS_ENV: &str = "CACHE_TTL_SECS";
/// Environment variable name for the in-process cache capacity.
pub const CACHE_CAPACITY_ENV: &str = "CACHE_CAPACITY";
/// Environment variable name for the shared cache URL.
pub const REDIS_URL_ENV: &str = "REDIS_URL";
/// Environment variable name for the default page size.
pub const PAGINATION_LIMIT_ENV: &str = "PAGINATION_LIMIT";

const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_JWT_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: usize = 10_000;
const DEFAULT_PAGINATION_LIMIT: u32 = 20;

/// Upper bound applied to any requested page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub redis_url: Option<String>,
    pub pagination_limit: u32,
}

impl CatalogConfig {
    /// Load the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present;
    /// variables already set in the environment take precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;

        Ok(Self {
            database_url: lookup(DATABASE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(
                &lookup,
                DATABASE_MAX_CONNECTIONS_ENV,
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            jwt_secret,
            jwt_ttl: Duration::from_secs(parse_or(&lookup, JWT_TTL_SECS_ENV, DEFAULT_JWT_TTL_SECS)?),
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                CACHE_TTL_SECS_ENV,
                DEFAULT_CACHE_TTL_SECS,
            )?),
            cache_capacity: parse_or(&lookup, CACHE_CAPACITY_ENV, DEFAULT_CACHE_CAPACITY)?,
            redis_url: lookup(REDIS_URL_ENV).filter(|url| !url.is_empty()),
            pagination_limit: parse_or(&lookup, PAGINATION_LIMIT_ENV, DEFAULT_PAGINATION_LIMIT)?,
        })
    }

    /// Resolve a requested page size against the configured default.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.pagination_limit)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

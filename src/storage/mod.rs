// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a relational store (SQLite through sqlx). A
//! cache sits in front of it holding JSON snapshots of single entities.
//!
//! ## Layout
//!
//! ```text
//! storage/
//!   sql.rs          # SqlStore: schema + parameterized statements
//!   cache.rs        # Cache trait, LruTtlCache, key namespaces
//!   redis_cache.rs  # RedisCache (feature "redis-cache")
//!   repository/     # cache-aside MerchantRepository / ProductRepository
//! ```
//!
//! ## Important Notes
//!
//! - The store is authoritative. The cache may be flushed at any time.
//! - A store write always happens before the matching cache invalidation.
//! - A cache backend failure is an error, not a miss.

pub mod cache;
#[cfg(feature = "redis-cache")]
pub mod redis_cache;
pub mod repository;
pub mod sql;

pub use cache::{Cache, CacheError, LruTtlCache};
#[cfg(feature = "redis-cache")]
pub use redis_cache::RedisCache;
pub use repository::{MerchantRepository, ProductRepository, RepositoryError, RepositoryResult};
pub use sql::{SqlStore, StoreError, StoreResult};

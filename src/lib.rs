// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog Service - Merchant & Product Catalog Core
//!
//! This crate provides the data-access and authorization core of a merchant
//! and product catalog: cache-aside repositories over a relational store,
//! signed bearer tokens, and per-request ownership checks.
//!
//! ## Modules
//!
//! - `auth` - Bearer tokens, password hashing, identity and ownership policy
//! - `config` - Environment configuration
//! - `error` - Service error kinds and HTTP mapping
//! - `models` - Entities, requests and responses
//! - `service` - Merchant, product and login use cases
//! - `state` - Shared application state
//! - `storage` - SQLite store, entity cache, cache-aside repositories

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;

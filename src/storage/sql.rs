// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational store adapter backed by SQLite through sqlx.
//!
//! ## Table Layout
//!
//! - `merchant`: `id, name, email (unique), password, created_at, updated_at`
//! - `product`: `id, name, price, merchant_id → merchant.id, created_at, updated_at`
//!
//! The schema lives in `migrations/` and is applied by [`SqlStore::migrate`].
//! The adapter only runs parameterized statements. It knows nothing about
//! the cache; see [`super::repository`] for the cache-aside layer.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::models::{Merchant, MerchantId, NewMerchant, NewProduct, Product, ProductId};

// =============================================================================
// Queries
// =============================================================================

const MERCHANT_COLUMNS: &str = "id, name, email, password, created_at, updated_at";

const PRODUCT_JOIN_SELECT: &str = r#"
    SELECT
        product.id AS product_id,
        product.name AS product_name,
        product.price AS product_price,
        product.merchant_id AS product_merchant_id,
        product.created_at AS product_created_at,
        product.updated_at AS product_updated_at,
        merchant.id AS merchant_id,
        merchant.name AS merchant_name,
        merchant.email AS merchant_email,
        merchant.password AS merchant_password,
        merchant.created_at AS merchant_created_at,
        merchant.updated_at AS merchant_updated_at
    FROM
        product
    INNER JOIN
        merchant
    ON
        product.merchant_id = merchant.id
"#;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Sort constraint violations out of generic database errors.
    fn classify(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(db_err.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Row Mapping
// =============================================================================

fn merchant_from_row(row: &SqliteRow) -> Result<Merchant, sqlx::Error> {
    Ok(Merchant {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("product_id")?,
        name: row.try_get("product_name")?,
        price: row.try_get("product_price")?,
        merchant_id: row.try_get("product_merchant_id")?,
        created_at: row.try_get("product_created_at")?,
        updated_at: row.try_get("product_updated_at")?,
        merchant: Merchant {
            id: row.try_get("merchant_id")?,
            name: row.try_get("merchant_name")?,
            email: row.try_get("merchant_email")?,
            password_hash: row.try_get("merchant_password")?,
            created_at: row.try_get("merchant_created_at")?,
            updated_at: row.try_get("merchant_updated_at")?,
        },
    })
}

fn like_pattern(name: &str) -> String {
    format!("%{name}%")
}

// =============================================================================
// SqlStore
// =============================================================================

/// Pooled handle to the relational store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url` with foreign keys enforced.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A private in-memory database on a single long-lived connection.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply any pending migrations from `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Merchant
    // =========================================================================

    /// Insert a merchant row and return the generated id.
    pub async fn insert_merchant(&self, merchant: &NewMerchant) -> StoreResult<MerchantId> {
        let result = sqlx::query(
            r#"
            INSERT INTO
                merchant (name, email, password, created_at)
            VALUES
                (?, ?, ?, ?)
            "#,
        )
        .bind(&merchant.name)
        .bind(&merchant.email)
        .bind(&merchant.password_hash)
        .bind(merchant.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_merchant(&self, id: MerchantId) -> StoreResult<Option<Merchant>> {
        let sql = format!("SELECT {MERCHANT_COLUMNS} FROM merchant WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(merchant_from_row).transpose()?)
    }

    pub async fn find_merchant_by_email(&self, email: &str) -> StoreResult<Option<Merchant>> {
        let sql = format!("SELECT {MERCHANT_COLUMNS} FROM merchant WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(merchant_from_row).transpose()?)
    }

    /// Page through merchants whose name contains `name`.
    pub async fn list_merchants(
        &self,
        limit: u32,
        offset: u32,
        name: &str,
    ) -> StoreResult<Vec<Merchant>> {
        let sql = format!(
            "SELECT {MERCHANT_COLUMNS} FROM merchant WHERE name LIKE ? ORDER BY id LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(name))
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(merchant_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Set a merchant's name and email. Returns the affected row count.
    pub async fn update_merchant_profile(
        &self,
        id: MerchantId,
        name: &str,
        email: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE
                merchant
            SET
                name = ?, email = ?, updated_at = ?
            WHERE
                id = ?
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }

    /// Replace a merchant's password hash. Returns the affected row count.
    pub async fn update_merchant_password(
        &self,
        id: MerchantId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE
                merchant
            SET
                password = ?, updated_at = ?
            WHERE
                id = ?
            "#,
        )
        .bind(password_hash)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }

    /// Delete a merchant row. Returns the affected row count.
    pub async fn delete_merchant(&self, id: MerchantId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM merchant WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Product
    // =========================================================================

    /// Insert a product row and return the generated id.
    pub async fn insert_product(&self, product: &NewProduct) -> StoreResult<ProductId> {
        let result = sqlx::query(
            r#"
            INSERT INTO
                product (name, price, merchant_id, created_at)
            VALUES
                (?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.merchant_id)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        Ok(result.last_insert_rowid())
    }

    /// Read a product joined with its owning merchant.
    pub async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("{PRODUCT_JOIN_SELECT} WHERE product.id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    /// Page through products whose name contains `name`, owners joined.
    pub async fn list_products(
        &self,
        limit: u32,
        offset: u32,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_JOIN_SELECT} WHERE product.name LIKE ? ORDER BY product.id LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(name))
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Overwrite a product's name, price and update time.
    pub async fn update_product(
        &self,
        id: ProductId,
        name: &str,
        price: f64,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE
                product
            SET
                name = ?, price = ?, updated_at = ?
            WHERE
                id = ?
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }

    pub async fn delete_product(&self, id: ProductId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::classify)?;

        Ok(result.rows_affected())
    }
}

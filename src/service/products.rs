// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product catalog operations.
//!
//! Any authenticated merchant may list a product, which it then owns.
//! Changes and deletion are reserved to the owner.

use std::sync::Arc;

use chrono::Utc;

use super::{validate_price, RequestContext};
use crate::auth::{require_authenticated, require_owner_of};
use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::models::{
    CreateProductRequest, ListQuery, NewProduct, ProductId, ProductResponse, UpdateProductRequest,
};
use crate::storage::ProductRepository;

#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
    config: Arc<CatalogConfig>,
}

impl ProductService {
    pub fn new(products: ProductRepository, config: Arc<CatalogConfig>) -> Self {
        Self { products, config }
    }

    /// List a product owned by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateProductRequest,
    ) -> CatalogResult<ProductResponse> {
        let merchant_id = require_authenticated(&ctx.identity)?;
        validate_price(request.price)?;

        let product = self
            .products
            .create(
                &NewProduct {
                    name: request.name,
                    price: request.price,
                    merchant_id,
                    created_at: Utc::now(),
                },
                &ctx.cancel,
            )
            .await?;

        Ok(product.into())
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> CatalogResult<Vec<ProductResponse>> {
        let limit = self.config.page_size(query.limit);
        let products = self
            .products
            .list(limit, query.offset, &query.name, &ctx.cancel)
            .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, ctx: &RequestContext, id: ProductId) -> CatalogResult<ProductResponse> {
        Ok(self.products.get(id, &ctx.cancel).await?.into())
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> CatalogResult<ProductResponse> {
        validate_price(request.price)?;

        let mut product = self.products.get(id, &ctx.cancel).await?;
        require_owner_of(&ctx.identity, &product)?;

        product.name = request.name;
        product.price = request.price;
        product.updated_at = Some(Utc::now());

        Ok(self.products.update(&product, &ctx.cancel).await?.into())
    }

    pub async fn delete(&self, ctx: &RequestContext, id: ProductId) -> CatalogResult<()> {
        let product = self.products.get(id, &ctx.cancel).await?;
        require_owner_of(&ctx.identity, &product)?;

        self.products.delete(id, &ctx.cancel).await?;
        Ok(())
    }
}

//! Product endpoints.

use std::sync::Arc;

use application::{CreateProduct, DeleteProduct, DeleteResult, ProductResult, UpdateProduct};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::{ProductId, SellerId};
use serde::Deserialize;

use super::{idempotency_key, parse_id};
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub idempotency_key: Option<String>,
    pub name: String,
    pub price: f64,
    pub seller_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub idempotency_key: Option<String>,
    pub name: String,
    pub price: f64,
    pub seller_id: String,
}

// -- Handlers --

/// POST /api/v1/products: create a product for an existing seller.
#[tracing::instrument(skip(state, headers))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResult>), ApiError> {
    let seller_id: SellerId = parse_id("seller", &req.seller_id)?;
    let cmd = CreateProduct::new(
        idempotency_key(&headers, req.idempotency_key)?,
        req.name,
        req.price,
        seller_id,
    );
    let result = state.products.create_product(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/products: list every product.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResult>>, ApiError> {
    Ok(Json(state.products.find_all_products().await?))
}

/// GET /api/v1/products/{id}: load one product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResult>, ApiError> {
    let id: ProductId = parse_id("product", &id)?;
    Ok(Json(state.products.find_product_by_id(id).await?))
}

/// PUT /api/v1/products/{id}: update name, price and seller.
#[tracing::instrument(skip(state, headers))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResult>, ApiError> {
    let id: ProductId = parse_id("product", &id)?;
    let seller_id: SellerId = parse_id("seller", &req.seller_id)?;
    let cmd = UpdateProduct::new(
        idempotency_key(&headers, req.idempotency_key)?,
        id,
        req.name,
        req.price,
        seller_id,
    );
    Ok(Json(state.products.update_product(cmd).await?))
}

/// DELETE /api/v1/products/{id}: delete a product.
///
/// The idempotency key is taken from the header only.
#[tracing::instrument(skip(state, headers))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResult>, ApiError> {
    let id: ProductId = parse_id("product", &id)?;
    let cmd = DeleteProduct::new(idempotency_key(&headers, None)?, id);
    Ok(Json(state.products.delete_product(cmd).await?))
}

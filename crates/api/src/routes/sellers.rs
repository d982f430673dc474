//! Seller endpoints.

use std::sync::Arc;

use application::{CreateSeller, DeleteResult, DeleteSeller, SellerResult, UpdateSeller};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::SellerId;
use serde::Deserialize;

use super::{idempotency_key, parse_id};
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateSellerRequest {
    pub idempotency_key: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSellerRequest {
    pub idempotency_key: Option<String>,
    pub name: String,
}

// -- Handlers --

/// POST /api/v1/sellers: create a seller.
#[tracing::instrument(skip(state, headers))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateSellerRequest>,
) -> Result<(StatusCode, Json<SellerResult>), ApiError> {
    let cmd = CreateSeller::new(idempotency_key(&headers, req.idempotency_key)?, req.name);
    let result = state.sellers.create_seller(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/sellers: list every seller.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SellerResult>>, ApiError> {
    Ok(Json(state.sellers.find_all_sellers().await?))
}

/// GET /api/v1/sellers/{id}: load one seller.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SellerResult>, ApiError> {
    let id: SellerId = parse_id("seller", &id)?;
    Ok(Json(state.sellers.find_seller_by_id(id).await?))
}

/// PUT /api/v1/sellers/{id}: rename a seller.
#[tracing::instrument(skip(state, headers))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateSellerRequest>,
) -> Result<Json<SellerResult>, ApiError> {
    let id: SellerId = parse_id("seller", &id)?;
    let cmd = UpdateSeller::new(idempotency_key(&headers, req.idempotency_key)?, id, req.name);
    Ok(Json(state.sellers.update_seller(cmd).await?))
}

/// DELETE /api/v1/sellers/{id}: delete a seller.
///
/// The idempotency key is taken from the header only.
#[tracing::instrument(skip(state, headers))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResult>, ApiError> {
    let id: SellerId = parse_id("seller", &id)?;
    let cmd = DeleteSeller::new(idempotency_key(&headers, None)?, id);
    Ok(Json(state.sellers.delete_seller(cmd).await?))
}

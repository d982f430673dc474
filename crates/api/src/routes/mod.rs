//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod products;
pub mod sellers;

use std::str::FromStr;

use axum::http::HeaderMap;

use crate::error::ApiError;

/// Header carrying the client-supplied idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Picks the idempotency key: the header wins over the body field, and a
/// request with neither gets the empty key.
///
/// A header that is not visible ASCII is rejected rather than ignored.
fn idempotency_key(headers: &HeaderMap, body_key: Option<String>) -> Result<String, ApiError> {
    match headers.get(IDEMPOTENCY_KEY_HEADER) {
        Some(value) => value.to_str().map(str::to_string).map_err(|_| {
            ApiError::BadRequest("Idempotency-Key header must be visible ASCII".to_string())
        }),
        None => Ok(body_key.unwrap_or_default()),
    }
}

fn parse_id<T>(kind: &str, id: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} ID format: {e}")))
}

//! Command and query results.
//!
//! Results are what gets cached per idempotency key, so they serialize to
//! JSON and read back to an equal value.

use chrono::{DateTime, Utc};
use common::{ProductId, SellerId};
use domain::{Product, Seller};
use serde::{Deserialize, Serialize};

/// A seller as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerResult {
    pub id: SellerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Seller> for SellerResult {
    fn from(seller: &Seller) -> Self {
        Self {
            id: seller.id(),
            name: seller.name().to_string(),
            created_at: seller.created_at(),
            updated_at: seller.updated_at(),
        }
    }
}

/// A product, with its seller snapshot, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResult {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub seller: SellerResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResult {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            price: product.price(),
            seller: SellerResult::from(product.seller()),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

/// Outcome of a delete command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}

//! Product entity.

use chrono::{DateTime, Utc};
use common::ProductId;

use crate::error::{ValidationError, check_timestamps};
use crate::seller::Seller;
use crate::validated::ValidatedSeller;

/// A product listed by a seller.
///
/// The product keeps its own copy of the seller as it was when the product was
/// created or last reassigned; later changes to the seller do not show up here.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    price: f64,
    seller: Seller,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a generated ID, timestamped now.
    ///
    /// Only a validated seller can own a product. The product itself is not
    /// validated; wrap it in a `ValidatedProduct` before persisting it.
    pub fn new(name: impl Into<String>, price: f64, seller: &ValidatedSeller) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            seller: seller.as_seller().clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a product from stored fields.
    pub fn from_parts(
        id: ProductId,
        name: impl Into<String>,
        price: f64,
        seller: Seller,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            seller,
            created_at,
            updated_at,
        }
    }

    /// Checks the product invariants, including those of its seller snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName { entity: "Product" });
        }
        // NaN and infinities fail here too.
        if !(self.price > 0.0 && self.price.is_finite()) {
            return Err(ValidationError::InvalidPrice { price: self.price });
        }
        check_timestamps("Product", self.created_at, self.updated_at)?;
        self.seller.validate()
    }

    /// Renames the product. On failure the product is left untouched.
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        self.try_update(|product| product.name = name)
    }

    /// Changes the price. On failure the product is left untouched.
    pub fn update_price(&mut self, price: f64) -> Result<(), ValidationError> {
        self.try_update(|product| product.price = price)
    }

    /// Replaces the seller snapshot. On failure the product is left untouched.
    pub fn change_seller(&mut self, seller: &ValidatedSeller) -> Result<(), ValidationError> {
        let seller = seller.as_seller().clone();
        self.try_update(|product| product.seller = seller)
    }

    /// Applies a change to a copy, bumps `updated_at`, validates, then commits.
    fn try_update(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), ValidationError> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.updated_at = Utc::now();
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Returns the seller snapshot.
    pub fn seller(&self) -> &Seller {
        &self.seller
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//! Entities that have passed validation.
//!
//! `ValidatedSeller` and `ValidatedProduct` can only be built through their
//! fallible `new` constructors, which run the entity's invariant checks. The
//! wrapped entity is private and exposed read-only, so a validated value can
//! never be changed into an invalid one. Repositories accept only these types.

use std::ops::Deref;

use crate::error::ValidationError;
use crate::product::Product;
use crate::seller::Seller;

/// A seller known to satisfy its invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSeller {
    seller: Seller,
}

impl ValidatedSeller {
    /// Validates the seller and wraps it.
    ///
    /// On failure the validation error is returned and nothing is wrapped.
    pub fn new(seller: Seller) -> Result<Self, ValidationError> {
        seller.validate()?;
        Ok(Self { seller })
    }

    /// Returns the validated seller.
    pub fn as_seller(&self) -> &Seller {
        &self.seller
    }

    /// Unwraps the seller, giving up the validation guarantee.
    pub fn into_inner(self) -> Seller {
        self.seller
    }
}

impl Deref for ValidatedSeller {
    type Target = Seller;

    fn deref(&self) -> &Seller {
        &self.seller
    }
}

/// A product known to satisfy its invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    product: Product,
}

impl ValidatedProduct {
    /// Validates the product and wraps it.
    ///
    /// On failure the validation error is returned and nothing is wrapped.
    pub fn new(product: Product) -> Result<Self, ValidationError> {
        product.validate()?;
        Ok(Self { product })
    }

    /// Returns the validated product.
    pub fn as_product(&self) -> &Product {
        &self.product
    }

    /// Unwraps the product, giving up the validation guarantee.
    pub fn into_inner(self) -> Product {
        self.product
    }
}

impl Deref for ValidatedProduct {
    type Target = Product;

    fn deref(&self) -> &Product {
        &self.product
    }
}

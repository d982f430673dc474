//! Seller entity.

use chrono::{DateTime, Utc};
use common::SellerId;

use crate::error::{ValidationError, check_timestamps};

/// A seller offering products on the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct Seller {
    id: SellerId,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Seller {
    /// Creates a new seller with a generated ID, timestamped now.
    ///
    /// The seller is not validated; wrap it in a `ValidatedSeller` before
    /// persisting it.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SellerId::new(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a seller from stored fields.
    pub fn from_parts(
        id: SellerId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            updated_at,
        }
    }

    /// Checks the seller invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName { entity: "Seller" });
        }
        check_timestamps("Seller", self.created_at, self.updated_at)
    }

    /// Renames the seller and bumps `updated_at`.
    ///
    /// The change is validated on a copy first; on failure the seller is left
    /// exactly as it was.
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let mut candidate = self.clone();
        candidate.name = name.into();
        candidate.updated_at = Utc::now();
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn id(&self) -> SellerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

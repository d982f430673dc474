//! Domain validation errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// An entity failed one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The entity name is empty.
    #[error("{entity} name must not be empty")]
    EmptyName { entity: &'static str },

    /// The product price is zero, negative or not a finite number.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: f64 },

    /// The entity was created after it was last updated.
    #[error("{entity} created_at {created_at} is after updated_at {updated_at}")]
    TimestampsOutOfOrder {
        entity: &'static str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName { .. } => "name",
            ValidationError::InvalidPrice { .. } => "price",
            ValidationError::TimestampsOutOfOrder { .. } => "created_at",
        }
    }
}

/// Checks that `created_at` does not come after `updated_at`.
pub(crate) fn check_timestamps(
    entity: &'static str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if created_at > updated_at {
        return Err(ValidationError::TimestampsOutOfOrder {
            entity,
            created_at,
            updated_at,
        });
    }
    Ok(())
}

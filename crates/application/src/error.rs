//! Service error types.

use domain::ValidationError;
use store::StoreError;
use thiserror::Error;

/// Errors returned by the command and query services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The entity failed its invariants.
    #[error("Validation failed on {field}: {0}", field = .0.field())]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A repository or the idempotency store failed.
    #[error("Storage failure during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A record exists for the key but carries no response, so the outcome of
    /// the earlier attempt is unknown.
    #[error("Duplicate idempotency key: {0}")]
    DuplicateIdempotencyKey(String),

    /// A cached request or response could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wraps a store error, keeping a not-found as `NotFound`.
    pub(crate) fn storage(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            source => ServiceError::Storage { operation, source },
        }
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = ServiceError::from(ValidationError::InvalidPrice { price: -1.0 });
        assert!(err.to_string().starts_with("Validation failed on price"));
    }

    #[test]
    fn store_not_found_stays_not_found() {
        let err = ServiceError::storage("update seller")(StoreError::NotFound {
            entity: "Seller",
            id: "42".into(),
        });
        assert!(matches!(err, ServiceError::NotFound { entity: "Seller", .. }));

        let err = ServiceError::storage("update seller")(StoreError::Unavailable("down".into()));
        assert!(matches!(
            err,
            ServiceError::Storage {
                operation: "update seller",
                ..
            }
        ));
    }
}

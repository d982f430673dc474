//! Domain layer for the marketplace backend.
//!
//! This crate provides the entities and the validation discipline that gates
//! every write:
//! - `Seller` and `Product` entities with their invariants
//! - `ValidatedSeller` and `ValidatedProduct`, obtainable only by passing
//!   validation
//! - `IdempotencyRecord` for caching the outcome of mutating commands
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod idempotency;
pub mod product;
pub mod seller;
pub mod validated;

pub use common::{IdempotencyRecordId, ProductId, SellerId};
pub use error::ValidationError;
pub use idempotency::IdempotencyRecord;
pub use product::Product;
pub use seller::Seller;
pub use validated::{ValidatedProduct, ValidatedSeller};

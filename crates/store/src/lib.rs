//! Persistence for the marketplace backend.
//!
//! Defines the repository contracts for sellers, products and idempotency
//! records, with an in-memory implementation for tests and a PostgreSQL
//! implementation built on sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryIdempotencyRepository, InMemoryProductRepository, InMemorySellerRepository,
};
pub use postgres::{
    PostgresIdempotencyRepository, PostgresProductRepository, PostgresSellerRepository,
    run_migrations,
};
pub use repository::{IdempotencyRepository, ProductRepository, SellerRepository};

//! Command services for the marketplace backend.
//!
//! This crate provides:
//! - Commands and results for sellers and products
//! - `IdempotentExecutor`, which replays the stored outcome of a command whose
//!   idempotency key was already seen
//! - `SellerService` and `ProductService`, tying validation, repositories and
//!   the executor together

pub mod commands;
pub mod error;
pub mod idempotency;
pub mod product_service;
pub mod results;
pub mod seller_service;

pub use commands::{
    Command, CreateProduct, CreateSeller, DeleteProduct, DeleteSeller, UpdateProduct, UpdateSeller,
};
pub use error::{Result, ServiceError};
pub use idempotency::{IdempotentExecutor, STATUS_CREATED, STATUS_OK};
pub use product_service::ProductService;
pub use results::{DeleteResult, ProductResult, SellerResult};
pub use seller_service::SellerService;

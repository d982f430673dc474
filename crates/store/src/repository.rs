use async_trait::async_trait;
use domain::{
    IdempotencyRecord, Product, ProductId, Seller, SellerId, ValidatedProduct, ValidatedSeller,
};

use crate::Result;

/// Persistence for sellers.
///
/// Writes accept only `ValidatedSeller`, so nothing that failed validation can
/// be stored. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SellerRepository: Send + Sync {
    /// Stores a new seller and returns it as persisted.
    async fn create(&self, seller: &ValidatedSeller) -> Result<Seller>;

    /// Retrieves a seller by ID.
    ///
    /// Returns None if the seller doesn't exist.
    async fn find_by_id(&self, id: SellerId) -> Result<Option<Seller>>;

    /// Retrieves all sellers, oldest first.
    async fn find_all(&self) -> Result<Vec<Seller>>;

    /// Replaces a stored seller.
    ///
    /// Fails with `NotFound` if the seller doesn't exist.
    async fn update(&self, seller: &ValidatedSeller) -> Result<Seller>;

    /// Deletes a seller.
    ///
    /// Fails with `NotFound` if the seller doesn't exist.
    async fn delete(&self, id: SellerId) -> Result<()>;
}

/// Persistence for products, including their seller snapshot.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores a new product and returns it as persisted.
    async fn create(&self, product: &ValidatedProduct) -> Result<Product>;

    /// Retrieves a product by ID.
    ///
    /// Returns None if the product doesn't exist.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Retrieves all products, oldest first.
    async fn find_all(&self) -> Result<Vec<Product>>;

    /// Replaces a stored product.
    ///
    /// Fails with `NotFound` if the product doesn't exist.
    async fn update(&self, product: &ValidatedProduct) -> Result<Product>;

    /// Deletes a product.
    ///
    /// Fails with `NotFound` if the product doesn't exist.
    async fn delete(&self, id: ProductId) -> Result<()>;
}

/// Persistence for idempotency records, keyed by the client-supplied key.
#[async_trait]
pub trait IdempotencyRepository: Send + Sync {
    /// Looks up the record for a key.
    ///
    /// Returns None only when the key is unknown; read failures are errors.
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>>;

    /// Stores a new record.
    ///
    /// Fails with `DuplicateIdempotencyKey` if a record with the same key
    /// already exists.
    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord>;

    /// Replaces the request, response and status code of a stored record.
    ///
    /// Fails with `NotFound` if no record has the same ID.
    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord>;
}

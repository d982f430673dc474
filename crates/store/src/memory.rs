use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use domain::{
    IdempotencyRecord, Product, ProductId, Seller, SellerId, ValidatedProduct, ValidatedSeller,
};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    repository::{IdempotencyRepository, ProductRepository, SellerRepository},
};

/// Counts write calls and injects failures for the in-memory repositories.
#[derive(Debug, Default)]
struct Instrumentation {
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Instrumentation {
    fn check_read(&self, operation: &str) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }

    fn check_write(&self, counter: &AtomicUsize, operation: &str) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }
}

macro_rules! instrumentation_accessors {
    ($repo:ty) => {
        impl $repo {
            /// Returns how many times `create` has been called.
            pub fn create_calls(&self) -> usize {
                self.instrumentation.creates.load(Ordering::SeqCst)
            }

            /// Returns how many times `update` has been called.
            pub fn update_calls(&self) -> usize {
                self.instrumentation.updates.load(Ordering::SeqCst)
            }

            /// Returns how many times `delete` has been called.
            pub fn delete_calls(&self) -> usize {
                self.instrumentation.deletes.load(Ordering::SeqCst)
            }

            /// Configures every subsequent read to fail.
            pub fn set_fail_on_read(&self, fail: bool) {
                self.instrumentation.fail_reads.store(fail, Ordering::SeqCst);
            }

            /// Configures every subsequent write to fail.
            pub fn set_fail_on_write(&self, fail: bool) {
                self.instrumentation
                    .fail_writes
                    .store(fail, Ordering::SeqCst);
            }
        }
    };
}

/// In-memory seller repository for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemorySellerRepository {
    sellers: Arc<RwLock<HashMap<SellerId, Seller>>>,
    instrumentation: Arc<Instrumentation>,
}

impl InMemorySellerRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sellers.
    pub async fn len(&self) -> usize {
        self.sellers.read().await.len()
    }

    /// Returns true if no sellers are stored.
    pub async fn is_empty(&self) -> bool {
        self.sellers.read().await.is_empty()
    }
}

instrumentation_accessors!(InMemorySellerRepository);

#[async_trait]
impl SellerRepository for InMemorySellerRepository {
    async fn create(&self, seller: &ValidatedSeller) -> Result<Seller> {
        self.instrumentation
            .check_write(&self.instrumentation.creates, "create seller")?;

        let mut sellers = self.sellers.write().await;
        if sellers.contains_key(&seller.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "Seller",
                id: seller.id().to_string(),
            });
        }
        sellers.insert(seller.id(), seller.as_seller().clone());
        Ok(seller.as_seller().clone())
    }

    async fn find_by_id(&self, id: SellerId) -> Result<Option<Seller>> {
        self.instrumentation.check_read("find seller")?;
        Ok(self.sellers.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Seller>> {
        self.instrumentation.check_read("list sellers")?;
        let mut sellers: Vec<_> = self.sellers.read().await.values().cloned().collect();
        sellers.sort_by_key(|s| (s.created_at(), s.id().as_uuid()));
        Ok(sellers)
    }

    async fn update(&self, seller: &ValidatedSeller) -> Result<Seller> {
        self.instrumentation
            .check_write(&self.instrumentation.updates, "update seller")?;

        let mut sellers = self.sellers.write().await;
        let stored = sellers
            .get_mut(&seller.id())
            .ok_or_else(|| StoreError::not_found("Seller", seller.id()))?;
        *stored = seller.as_seller().clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: SellerId) -> Result<()> {
        self.instrumentation
            .check_write(&self.instrumentation.deletes, "delete seller")?;

        self.sellers
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Seller", id))
    }
}

/// In-memory product repository for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    instrumentation: Arc<Instrumentation>,
}

impl InMemoryProductRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Returns true if no products are stored.
    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

instrumentation_accessors!(InMemoryProductRepository);

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &ValidatedProduct) -> Result<Product> {
        self.instrumentation
            .check_write(&self.instrumentation.creates, "create product")?;

        let mut products = self.products.write().await;
        if products.contains_key(&product.id()) {
            return Err(StoreError::AlreadyExists {
                entity: "Product",
                id: product.id().to_string(),
            });
        }
        products.insert(product.id(), product.as_product().clone());
        Ok(product.as_product().clone())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        self.instrumentation.check_read("find product")?;
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        self.instrumentation.check_read("list products")?;
        let mut products: Vec<_> = self.products.read().await.values().cloned().collect();
        products.sort_by_key(|p| (p.created_at(), p.id().as_uuid()));
        Ok(products)
    }

    async fn update(&self, product: &ValidatedProduct) -> Result<Product> {
        self.instrumentation
            .check_write(&self.instrumentation.updates, "update product")?;

        let mut products = self.products.write().await;
        let stored = products
            .get_mut(&product.id())
            .ok_or_else(|| StoreError::not_found("Product", product.id()))?;
        *stored = product.as_product().clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        self.instrumentation
            .check_write(&self.instrumentation.deletes, "delete product")?;

        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Product", id))
    }
}

/// In-memory idempotency store for testing and local runs.
///
/// Records are keyed by their idempotency key, mirroring the unique constraint
/// of the PostgreSQL table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdempotencyRepository {
    records: Arc<RwLock<HashMap<String, IdempotencyRecord>>>,
    instrumentation: Arc<Instrumentation>,
}

impl InMemoryIdempotencyRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

instrumentation_accessors!(InMemoryIdempotencyRepository);

#[async_trait]
impl IdempotencyRepository for InMemoryIdempotencyRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        self.instrumentation.check_read("find idempotency record")?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord> {
        self.instrumentation
            .check_write(&self.instrumentation.creates, "create idempotency record")?;

        let mut records = self.records.write().await;
        if records.contains_key(record.key()) {
            return Err(StoreError::DuplicateIdempotencyKey(record.key().to_string()));
        }
        records.insert(record.key().to_string(), record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord> {
        self.instrumentation
            .check_write(&self.instrumentation.updates, "update idempotency record")?;

        let mut records = self.records.write().await;
        let stored = records
            .values_mut()
            .find(|stored| stored.id() == record.id())
            .ok_or_else(|| StoreError::not_found("IdempotencyRecord", record.id()))?;

        // Key and creation time are fixed once stored.
        *stored = IdempotencyRecord::from_parts(
            stored.id(),
            stored.key(),
            record.request(),
            record.response(),
            record.status_code(),
            stored.created_at(),
        );
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated_seller(name: &str) -> ValidatedSeller {
        ValidatedSeller::new(Seller::new(name)).unwrap()
    }

    fn validated_product(seller: &ValidatedSeller, name: &str, price: f64) -> ValidatedProduct {
        ValidatedProduct::new(Product::new(name, price, seller)).unwrap()
    }

    #[tokio::test]
    async fn create_and_find_seller() {
        let repo = InMemorySellerRepository::new();
        let seller = validated_seller("John Doe");

        let created = repo.create(&seller).await.unwrap();
        assert_eq!(&created, seller.as_seller());

        let found = repo.find_by_id(seller.id()).await.unwrap();
        assert_eq!(found.as_ref(), Some(seller.as_seller()));
        assert_eq!(repo.create_calls(), 1);
    }

    #[tokio::test]
    async fn creating_same_seller_twice_fails() {
        let repo = InMemorySellerRepository::new();
        let seller = validated_seller("John Doe");

        repo.create(&seller).await.unwrap();
        let result = repo.create(&seller).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_seller_is_none() {
        let repo = InMemorySellerRepository::new();
        assert!(repo.find_by_id(SellerId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_seller_fail() {
        let repo = InMemorySellerRepository::new();
        let seller = validated_seller("Ghost");

        assert!(matches!(
            repo.update(&seller).await,
            Err(StoreError::NotFound {
                entity: "Seller",
                ..
            })
        ));
        assert!(matches!(
            repo.delete(seller.id()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(repo.update_calls(), 1);
        assert_eq!(repo.delete_calls(), 1);
    }

    #[tokio::test]
    async fn update_seller_replaces_stored_value() {
        let repo = InMemorySellerRepository::new();
        let seller = validated_seller("Old");
        repo.create(&seller).await.unwrap();

        let mut renamed = seller.clone().into_inner();
        renamed.update_name("New").unwrap();
        let renamed = ValidatedSeller::new(renamed).unwrap();
        repo.update(&renamed).await.unwrap();

        let found = repo.find_by_id(seller.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "New");
    }

    #[tokio::test]
    async fn find_all_returns_oldest_first() {
        let repo = InMemorySellerRepository::new();
        let first = validated_seller("First");
        let second = validated_seller("Second");
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at() <= all[1].created_at());
    }

    #[tokio::test]
    async fn product_keeps_its_seller_snapshot() {
        let sellers = InMemorySellerRepository::new();
        let products = InMemoryProductRepository::new();
        let seller = validated_seller("John Doe");
        sellers.create(&seller).await.unwrap();
        let product = validated_product(&seller, "Widget", 10.0);
        products.create(&product).await.unwrap();

        let mut renamed = seller.clone().into_inner();
        renamed.update_name("Jane Doe").unwrap();
        sellers
            .update(&ValidatedSeller::new(renamed).unwrap())
            .await
            .unwrap();

        let stored = products.find_by_id(product.id()).await.unwrap().unwrap();
        assert_eq!(stored.seller().name(), "John Doe");
    }

    #[tokio::test]
    async fn delete_product_removes_it() {
        let products = InMemoryProductRepository::new();
        let product = validated_product(&validated_seller("John"), "Widget", 10.0);
        products.create(&product).await.unwrap();

        products.delete(product.id()).await.unwrap();

        assert!(products.is_empty().await);
        assert!(products.find_by_id(product.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let products = InMemoryProductRepository::new();
        products.set_fail_on_read(true);
        assert!(matches!(
            products.find_all().await,
            Err(StoreError::Unavailable(_))
        ));

        products.set_fail_on_write(true);
        let product = validated_product(&validated_seller("John"), "Widget", 10.0);
        assert!(matches!(
            products.create(&product).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(products.create_calls(), 1);
    }

    #[tokio::test]
    async fn idempotency_record_roundtrip() {
        let repo = InMemoryIdempotencyRepository::new();
        let mut record = IdempotencyRecord::new("abc", "{}");
        record.set_response(r#"{"success":true}"#, 200);

        repo.create(&record).await.unwrap();

        let found = repo.find_by_key("abc").await.unwrap();
        assert_eq!(found, Some(record));
        assert!(repo.find_by_key("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_rejected() {
        let repo = InMemoryIdempotencyRepository::new();
        repo.create(&IdempotencyRecord::new("abc", "{}"))
            .await
            .unwrap();

        let result = repo.create(&IdempotencyRecord::new("abc", "{}")).await;

        assert!(matches!(
            result,
            Err(StoreError::DuplicateIdempotencyKey(key)) if key == "abc"
        ));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_attaches_response_to_stored_record() {
        let repo = InMemoryIdempotencyRepository::new();
        let mut record = IdempotencyRecord::new("abc", "{}");
        repo.create(&record).await.unwrap();

        record.set_response(r#"{"success":true}"#, 200);
        let updated = repo.update(&record).await.unwrap();

        assert_eq!(updated.status_code(), Some(200));
        assert_eq!(updated.created_at(), record.created_at());
        let found = repo.find_by_key("abc").await.unwrap().unwrap();
        assert!(found.has_response());
    }

    #[tokio::test]
    async fn update_unknown_record_fails() {
        let repo = InMemoryIdempotencyRepository::new();
        let result = repo.update(&IdempotencyRecord::new("abc", "{}")).await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "IdempotencyRecord",
                ..
            })
        ));
    }
}

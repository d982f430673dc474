//! Product command and query service.

use std::sync::Arc;

use common::{ProductId, SellerId};
use domain::{Product, ValidatedProduct, ValidatedSeller};
use store::{ProductRepository, SellerRepository};

use crate::commands::{CreateProduct, DeleteProduct, UpdateProduct};
use crate::error::{Result, ServiceError};
use crate::idempotency::{IdempotentExecutor, STATUS_CREATED, STATUS_OK};
use crate::results::{DeleteResult, ProductResult};

/// Service for managing products.
///
/// Products reference their seller by value: the seller is looked up when the
/// product is created or reassigned, validated, and copied into the product.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    sellers: Arc<dyn SellerRepository>,
    executor: IdempotentExecutor,
}

impl ProductService {
    /// Creates a new product service.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        sellers: Arc<dyn SellerRepository>,
        executor: IdempotentExecutor,
    ) -> Self {
        Self {
            products,
            sellers,
            executor,
        }
    }

    /// Creates a product owned by an existing seller.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<ProductResult> {
        metrics::counter!("commands_total", "command" => "create_product").increment(1);

        self.executor
            .execute(&cmd, STATUS_CREATED, async {
                let seller = self.load_seller(cmd.seller_id).await?;
                let product = Product::new(cmd.name.as_str(), cmd.price, &seller);
                let product = ValidatedProduct::new(product)?;

                let stored = self
                    .products
                    .create(&product)
                    .await
                    .map_err(ServiceError::storage("create product"))?;
                tracing::info!(product_id = %stored.id(), "product created");
                Ok(ProductResult::from(&stored))
            })
            .await
    }

    /// Updates a product's name and price, and its seller when the seller ID
    /// differs from the current snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<ProductResult> {
        metrics::counter!("commands_total", "command" => "update_product").increment(1);

        self.executor
            .execute(&cmd, STATUS_OK, async {
                let mut product = self.load(cmd.id).await?;

                if product.seller().id() != cmd.seller_id {
                    let seller = self.load_seller(cmd.seller_id).await?;
                    product.change_seller(&seller)?;
                }
                product.update_name(cmd.name.as_str())?;
                product.update_price(cmd.price)?;
                let product = ValidatedProduct::new(product)?;

                let stored = self
                    .products
                    .update(&product)
                    .await
                    .map_err(ServiceError::storage("update product"))?;
                Ok(ProductResult::from(&stored))
            })
            .await
    }

    /// Deletes a product.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, cmd: DeleteProduct) -> Result<DeleteResult> {
        metrics::counter!("commands_total", "command" => "delete_product").increment(1);

        self.executor
            .execute(&cmd, STATUS_OK, async {
                self.load(cmd.id).await?;
                self.products
                    .delete(cmd.id)
                    .await
                    .map_err(ServiceError::storage("delete product"))?;
                Ok(DeleteResult { success: true })
            })
            .await
    }

    /// Returns every product, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn find_all_products(&self) -> Result<Vec<ProductResult>> {
        let products = self
            .products
            .find_all()
            .await
            .map_err(ServiceError::storage("list products"))?;
        Ok(products.iter().map(ProductResult::from).collect())
    }

    /// Returns one product.
    #[tracing::instrument(skip(self))]
    pub async fn find_product_by_id(&self, id: ProductId) -> Result<ProductResult> {
        self.load(id).await.map(|product| ProductResult::from(&product))
    }

    async fn load(&self, id: ProductId) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await
            .map_err(ServiceError::storage("find product"))?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    async fn load_seller(&self, id: SellerId) -> Result<ValidatedSeller> {
        let seller = self
            .sellers
            .find_by_id(id)
            .await
            .map_err(ServiceError::storage("find seller"))?
            .ok_or_else(|| ServiceError::not_found("Seller", id))?;
        Ok(ValidatedSeller::new(seller)?)
    }
}

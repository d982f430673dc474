//! Seller command and query service.

use std::sync::Arc;

use common::SellerId;
use domain::{Seller, ValidatedSeller};
use store::SellerRepository;

use crate::commands::{CreateSeller, DeleteSeller, UpdateSeller};
use crate::error::{Result, ServiceError};
use crate::idempotency::{IdempotentExecutor, STATUS_CREATED, STATUS_OK};
use crate::results::{DeleteResult, SellerResult};

/// Service for managing sellers.
///
/// Mutating commands go through the idempotency executor; queries read the
/// repository directly.
#[derive(Clone)]
pub struct SellerService {
    sellers: Arc<dyn SellerRepository>,
    executor: IdempotentExecutor,
}

impl SellerService {
    /// Creates a new seller service.
    pub fn new(sellers: Arc<dyn SellerRepository>, executor: IdempotentExecutor) -> Self {
        Self { sellers, executor }
    }

    /// Creates a seller.
    #[tracing::instrument(skip(self))]
    pub async fn create_seller(&self, cmd: CreateSeller) -> Result<SellerResult> {
        metrics::counter!("commands_total", "command" => "create_seller").increment(1);

        self.executor
            .execute(&cmd, STATUS_CREATED, async {
                let seller = ValidatedSeller::new(Seller::new(cmd.name.as_str()))?;
                let stored = self
                    .sellers
                    .create(&seller)
                    .await
                    .map_err(ServiceError::storage("create seller"))?;
                tracing::info!(seller_id = %stored.id(), "seller created");
                Ok(SellerResult::from(&stored))
            })
            .await
    }

    /// Renames a seller.
    #[tracing::instrument(skip(self))]
    pub async fn update_seller(&self, cmd: UpdateSeller) -> Result<SellerResult> {
        metrics::counter!("commands_total", "command" => "update_seller").increment(1);

        self.executor
            .execute(&cmd, STATUS_OK, async {
                let mut seller = self.load(cmd.id).await?;
                seller.update_name(cmd.name.as_str())?;
                let seller = ValidatedSeller::new(seller)?;

                let stored = self
                    .sellers
                    .update(&seller)
                    .await
                    .map_err(ServiceError::storage("update seller"))?;
                Ok(SellerResult::from(&stored))
            })
            .await
    }

    /// Deletes a seller.
    ///
    /// Products keep their own seller snapshot and are not touched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_seller(&self, cmd: DeleteSeller) -> Result<DeleteResult> {
        metrics::counter!("commands_total", "command" => "delete_seller").increment(1);

        self.executor
            .execute(&cmd, STATUS_OK, async {
                self.load(cmd.id).await?;
                self.sellers
                    .delete(cmd.id)
                    .await
                    .map_err(ServiceError::storage("delete seller"))?;
                Ok(DeleteResult { success: true })
            })
            .await
    }

    /// Returns every seller, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn find_all_sellers(&self) -> Result<Vec<SellerResult>> {
        let sellers = self
            .sellers
            .find_all()
            .await
            .map_err(ServiceError::storage("list sellers"))?;
        Ok(sellers.iter().map(SellerResult::from).collect())
    }

    /// Returns one seller.
    #[tracing::instrument(skip(self))]
    pub async fn find_seller_by_id(&self, id: SellerId) -> Result<SellerResult> {
        self.load(id).await.map(|seller| SellerResult::from(&seller))
    }

    async fn load(&self, id: SellerId) -> Result<Seller> {
        self.sellers
            .find_by_id(id)
            .await
            .map_err(ServiceError::storage("find seller"))?
            .ok_or_else(|| ServiceError::not_found("Seller", id))
    }
}

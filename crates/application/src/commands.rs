//! Mutating commands.
//!
//! Every command carries a client-supplied idempotency key. An empty key turns
//! idempotency handling off for that call.

use common::{ProductId, SellerId};
use serde::{Deserialize, Serialize};

/// A state-changing request that can be replayed by idempotency key.
pub trait Command: Serialize {
    /// Name of the command, stored with the request so a key cannot replay
    /// across command kinds.
    const NAME: &'static str;

    /// Returns the idempotency key, empty when the client supplied none.
    fn idempotency_key(&self) -> &str;
}

/// Command to create a new seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSeller {
    #[serde(default)]
    pub idempotency_key: String,
    pub name: String,
}

impl CreateSeller {
    /// Creates a new CreateSeller command.
    pub fn new(idempotency_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            name: name.into(),
        }
    }
}

/// Command to rename an existing seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSeller {
    #[serde(default)]
    pub idempotency_key: String,
    pub id: SellerId,
    pub name: String,
}

impl UpdateSeller {
    /// Creates a new UpdateSeller command.
    pub fn new(idempotency_key: impl Into<String>, id: SellerId, name: impl Into<String>) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            id,
            name: name.into(),
        }
    }
}

/// Command to delete a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSeller {
    #[serde(default)]
    pub idempotency_key: String,
    pub id: SellerId,
}

impl DeleteSeller {
    /// Creates a new DeleteSeller command.
    pub fn new(idempotency_key: impl Into<String>, id: SellerId) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            id,
        }
    }
}

/// Command to create a product owned by an existing seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    #[serde(default)]
    pub idempotency_key: String,
    pub name: String,
    pub price: f64,
    pub seller_id: SellerId,
}

impl CreateProduct {
    /// Creates a new CreateProduct command.
    pub fn new(
        idempotency_key: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        seller_id: SellerId,
    ) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            name: name.into(),
            price,
            seller_id,
        }
    }
}

/// Command to update a product's name, price and seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub idempotency_key: String,
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub seller_id: SellerId,
}

impl UpdateProduct {
    /// Creates a new UpdateProduct command.
    pub fn new(
        idempotency_key: impl Into<String>,
        id: ProductId,
        name: impl Into<String>,
        price: f64,
        seller_id: SellerId,
    ) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            id,
            name: name.into(),
            price,
            seller_id,
        }
    }
}

/// Command to delete a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteProduct {
    #[serde(default)]
    pub idempotency_key: String,
    pub id: ProductId,
}

impl DeleteProduct {
    /// Creates a new DeleteProduct command.
    pub fn new(idempotency_key: impl Into<String>, id: ProductId) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            id,
        }
    }
}

macro_rules! impl_command {
    ($($cmd:ty),+ $(,)?) => {
        $(
            impl Command for $cmd {
                const NAME: &'static str = stringify!($cmd);

                fn idempotency_key(&self) -> &str {
                    &self.idempotency_key
                }
            }
        )+
    };
}

impl_command!(
    CreateSeller,
    UpdateSeller,
    DeleteSeller,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
);

use async_trait::async_trait;
use domain::{
    IdempotencyRecord, IdempotencyRecordId, Product, ProductId, Seller, SellerId,
    ValidatedProduct, ValidatedSeller,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    repository::{IdempotencyRepository, ProductRepository, SellerRepository},
};

const SELLER_COLUMNS: &str = "id, name, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, name, price, seller_id, seller_name, seller_created_at, \
     seller_updated_at, created_at, updated_at";

const IDEMPOTENCY_COLUMNS: &str = "id, key, request, response, status_code, created_at";

/// Runs the database migrations.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Maps a unique-constraint violation on `constraint` to `on_conflict`,
/// passing every other error through as a database error.
fn map_conflict(
    err: sqlx::Error,
    constraint: &str,
    on_conflict: impl FnOnce() -> StoreError,
) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.constraint() == Some(constraint)
    {
        return on_conflict();
    }
    StoreError::Database(err)
}

/// PostgreSQL-backed seller repository.
#[derive(Clone)]
pub struct PostgresSellerRepository {
    pool: PgPool,
}

impl PostgresSellerRepository {
    /// Creates a new PostgreSQL seller repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_seller(row: PgRow) -> Result<Seller> {
        Ok(Seller::from_parts(
            SellerId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("name")?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        ))
    }
}

#[async_trait]
impl SellerRepository for PostgresSellerRepository {
    async fn create(&self, seller: &ValidatedSeller) -> Result<Seller> {
        let row = sqlx::query(&format!(
            "INSERT INTO sellers (id, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) RETURNING {SELLER_COLUMNS}"
        ))
        .bind(seller.id().as_uuid())
        .bind(seller.name())
        .bind(seller.created_at())
        .bind(seller.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_conflict(e, "sellers_pkey", || StoreError::AlreadyExists {
                entity: "Seller",
                id: seller.id().to_string(),
            })
        })?;

        Self::row_to_seller(row)
    }

    async fn find_by_id(&self, id: SellerId) -> Result<Option<Seller>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_seller).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Seller>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELLER_COLUMNS} FROM sellers ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_seller).collect()
    }

    async fn update(&self, seller: &ValidatedSeller) -> Result<Seller> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "UPDATE sellers SET name = $2, created_at = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {SELLER_COLUMNS}"
        ))
        .bind(seller.id().as_uuid())
        .bind(seller.name())
        .bind(seller.created_at())
        .bind(seller.updated_at())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_seller(row),
            None => Err(StoreError::not_found("Seller", seller.id())),
        }
    }

    async fn delete(&self, id: SellerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM sellers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Seller", id));
        }
        Ok(())
    }
}

/// PostgreSQL-backed product repository.
///
/// The seller snapshot is stored in `seller_*` columns of the product row.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a new PostgreSQL product repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let seller = Seller::from_parts(
            SellerId::from_uuid(row.try_get::<Uuid, _>("seller_id")?),
            row.try_get::<String, _>("seller_name")?,
            row.try_get("seller_created_at")?,
            row.try_get("seller_updated_at")?,
        );

        Ok(Product::from_parts(
            ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("name")?,
            row.try_get("price")?,
            seller,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        ))
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &ValidatedProduct) -> Result<Product> {
        let seller = product.seller();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (id, name, price, seller_id, seller_name, seller_created_at,
                                  seller_updated_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id().as_uuid())
        .bind(product.name())
        .bind(product.price())
        .bind(seller.id().as_uuid())
        .bind(seller.name())
        .bind(seller.created_at())
        .bind(seller.updated_at())
        .bind(product.created_at())
        .bind(product.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_conflict(e, "products_pkey", || StoreError::AlreadyExists {
                entity: "Product",
                id: product.id().to_string(),
            })
        })?;

        Self::row_to_product(row)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn update(&self, product: &ValidatedProduct) -> Result<Product> {
        let seller = product.seller();
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE products SET
                name = $2,
                price = $3,
                seller_id = $4,
                seller_name = $5,
                seller_created_at = $6,
                seller_updated_at = $7,
                created_at = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id().as_uuid())
        .bind(product.name())
        .bind(product.price())
        .bind(seller.id().as_uuid())
        .bind(seller.name())
        .bind(seller.created_at())
        .bind(seller.updated_at())
        .bind(product.created_at())
        .bind(product.updated_at())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("Product", product.id())),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }
}

/// PostgreSQL-backed idempotency store.
///
/// The `unique_idempotency_key` constraint turns a second `create` for the same
/// key into `DuplicateIdempotencyKey`, including across processes.
#[derive(Clone)]
pub struct PostgresIdempotencyRepository {
    pool: PgPool,
}

impl PostgresIdempotencyRepository {
    /// Creates a new PostgreSQL idempotency repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: PgRow) -> Result<IdempotencyRecord> {
        let status_code = row
            .try_get::<Option<i32>, _>("status_code")?
            .map(|code| {
                u16::try_from(code)
                    .map_err(|_| StoreError::InvalidData(format!("status code {code} out of range")))
            })
            .transpose()?;

        Ok(IdempotencyRecord::from_parts(
            IdempotencyRecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("key")?,
            row.try_get::<String, _>("request")?,
            row.try_get::<String, _>("response")?,
            status_code,
            row.try_get("created_at")?,
        ))
    }
}

#[async_trait]
impl IdempotencyRepository for PostgresIdempotencyRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {IDEMPOTENCY_COLUMNS} FROM idempotency_records WHERE key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO idempotency_records (id, key, request, response, status_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {IDEMPOTENCY_COLUMNS}
            "#
        ))
        .bind(record.id().as_uuid())
        .bind(record.key())
        .bind(record.request())
        .bind(record.response())
        .bind(record.status_code().map(i32::from))
        .bind(record.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_conflict(e, "unique_idempotency_key", || {
                StoreError::DuplicateIdempotencyKey(record.key().to_string())
            })
        })?;

        Self::row_to_record(row)
    }

    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord> {
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE idempotency_records SET request = $2, response = $3, status_code = $4
            WHERE id = $1
            RETURNING {IDEMPOTENCY_COLUMNS}
            "#
        ))
        .bind(record.id().as_uuid())
        .bind(record.request())
        .bind(record.response())
        .bind(record.status_code().map(i32::from))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_record(row),
            None => Err(StoreError::not_found("IdempotencyRecord", record.id())),
        }
    }
}

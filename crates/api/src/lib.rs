//! HTTP API server with observability for the marketplace backend.
//!
//! Provides REST endpoints for sellers and products, with structured logging
//! (tracing) and Prometheus metrics. Mutating endpoints honor the
//! `Idempotency-Key` header.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{IdempotentExecutor, ProductService, SellerService};
use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::{
    IdempotencyRepository, InMemoryIdempotencyRepository, InMemoryProductRepository,
    InMemorySellerRepository, PostgresIdempotencyRepository, PostgresProductRepository,
    PostgresSellerRepository, ProductRepository, SellerRepository, StoreError,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub sellers: SellerService,
    pub products: ProductService,
}

impl AppState {
    /// Wires both services to the given repositories, sharing one idempotency
    /// executor.
    pub fn new(
        sellers: Arc<dyn SellerRepository>,
        products: Arc<dyn ProductRepository>,
        idempotency: Arc<dyn IdempotencyRepository>,
    ) -> Self {
        let executor = IdempotentExecutor::new(idempotency);
        Self {
            sellers: SellerService::new(sellers.clone(), executor.clone()),
            products: ProductService::new(products, sellers, executor),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/sellers",
            get(routes::sellers::list).post(routes::sellers::create),
        )
        .route(
            "/sellers/{id}",
            get(routes::sellers::get)
                .put(routes::sellers::update)
                .delete(routes::sellers::delete),
        )
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        );

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory repositories.
pub fn create_in_memory_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(InMemorySellerRepository::new()),
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemoryIdempotencyRepository::new()),
    ))
}

/// Connects to PostgreSQL, runs migrations and creates application state
/// backed by the PostgreSQL repositories.
pub async fn create_postgres_state(
    database_url: &str,
    max_connections: u32,
) -> Result<Arc<AppState>, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    store::run_migrations(&pool).await?;

    Ok(Arc::new(AppState::new(
        Arc::new(PostgresSellerRepository::new(pool.clone())),
        Arc::new(PostgresProductRepository::new(pool.clone())),
        Arc::new(PostgresIdempotencyRepository::new(pool)),
    )))
}

//! Integration tests for the seller service over the in-memory repositories.

use std::sync::Arc;

use application::{
    CreateSeller, DeleteSeller, IdempotentExecutor, SellerService, ServiceError, UpdateSeller,
};
use common::SellerId;
use store::{IdempotencyRepository, InMemoryIdempotencyRepository, InMemorySellerRepository};

struct Fixture {
    service: SellerService,
    sellers: InMemorySellerRepository,
    idempotency: InMemoryIdempotencyRepository,
}

fn fixture() -> Fixture {
    let sellers = InMemorySellerRepository::new();
    let idempotency = InMemoryIdempotencyRepository::new();
    let executor = IdempotentExecutor::new(Arc::new(idempotency.clone()));
    Fixture {
        service: SellerService::new(Arc::new(sellers.clone()), executor),
        sellers,
        idempotency,
    }
}

#[tokio::test]
async fn create_seller_persists_and_returns_result() {
    let fx = fixture();

    let result = fx
        .service
        .create_seller(CreateSeller::new("", "John Doe"))
        .await
        .unwrap();

    assert_eq!(result.name, "John Doe");
    assert_eq!(result.created_at, result.updated_at);
    assert_eq!(fx.sellers.len().await, 1);
    assert!(fx.idempotency.is_empty().await);
}

#[tokio::test]
async fn create_seller_replays_by_key() {
    let fx = fixture();

    let first = fx
        .service
        .create_seller(CreateSeller::new("seller-1", "John Doe"))
        .await
        .unwrap();
    let second = fx
        .service
        .create_seller(CreateSeller::new("seller-1", "Someone Else"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.sellers.create_calls(), 1);

    let record = fx
        .idempotency
        .find_by_key("seller-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status_code(), Some(201));
}

#[tokio::test]
async fn create_seller_with_empty_name_fails_validation() {
    let fx = fixture();

    let err = fx
        .service
        .create_seller(CreateSeller::new("seller-1", ""))
        .await
        .unwrap_err();

    match err {
        ServiceError::Validation(e) => assert_eq!(e.field(), "name"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(fx.sellers.create_calls(), 0);
    assert!(fx.idempotency.is_empty().await);
}

#[tokio::test]
async fn update_seller_renames_and_bumps_timestamp() {
    let fx = fixture();
    let created = fx
        .service
        .create_seller(CreateSeller::new("", "Old Name"))
        .await
        .unwrap();

    let updated = fx
        .service
        .update_seller(UpdateSeller::new("rename-1", created.id, "New Name"))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let found = fx.service.find_seller_by_id(created.id).await.unwrap();
    assert_eq!(found, updated);
}

#[tokio::test]
async fn update_unknown_seller_is_not_found() {
    let fx = fixture();

    let err = fx
        .service
        .update_seller(UpdateSeller::new("k", SellerId::new(), "Name"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { entity: "Seller", .. }));
    assert_eq!(fx.sellers.update_calls(), 0);
    assert!(fx.idempotency.is_empty().await);
}

#[tokio::test]
async fn rejected_rename_keeps_stored_seller() {
    let fx = fixture();
    let created = fx
        .service
        .create_seller(CreateSeller::new("", "John Doe"))
        .await
        .unwrap();

    let err = fx
        .service
        .update_seller(UpdateSeller::new("", created.id, ""))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(fx.sellers.update_calls(), 0);
    let found = fx.service.find_seller_by_id(created.id).await.unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn delete_seller_replays_success() {
    let fx = fixture();
    let created = fx
        .service
        .create_seller(CreateSeller::new("", "John Doe"))
        .await
        .unwrap();

    let first = fx
        .service
        .delete_seller(DeleteSeller::new("delete-1", created.id))
        .await
        .unwrap();
    // The seller is gone, but the key replays the first outcome.
    let second = fx
        .service
        .delete_seller(DeleteSeller::new("delete-1", created.id))
        .await
        .unwrap();

    assert!(first.success);
    assert_eq!(first, second);
    assert_eq!(fx.sellers.delete_calls(), 1);
    assert!(fx.sellers.is_empty().await);
}

#[tokio::test]
async fn delete_unknown_seller_is_not_found() {
    let fx = fixture();

    let err = fx
        .service
        .delete_seller(DeleteSeller::new("delete-1", SellerId::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(fx.sellers.delete_calls(), 0);
}

#[tokio::test]
async fn find_all_sellers_lists_every_seller() {
    let fx = fixture();
    for name in ["Alice", "Bob"] {
        fx.service
            .create_seller(CreateSeller::new("", name))
            .await
            .unwrap();
    }

    let all = fx.service.find_all_sellers().await.unwrap();

    let mut names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn find_unknown_seller_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .find_seller_by_id(SellerId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn repository_failure_is_a_storage_error() {
    let fx = fixture();
    fx.sellers.set_fail_on_write(true);

    let err = fx
        .service
        .create_seller(CreateSeller::new("seller-1", "John Doe"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Storage {
            operation: "create seller",
            ..
        }
    ));
    assert!(fx.idempotency.is_empty().await);
}

//! Cart store operations against a mock storefront API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rocketshoes_cart::api::ApiError;
use rocketshoes_cart::notify::Severity;
use rocketshoes_cart::{AmountUpdate, CartChange, CartError};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::TestContext;
use rust_decimal::Decimal;

// =============================================================================
// Add / update / remove
// =============================================================================

#[tokio::test]
async fn test_full_cart_flow() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(1, 5).await;
    let _product = ctx.mock_product(1, "Tênis de Caminhada", "179.9").await;

    let change = ctx.store.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(change, CartChange::Added(ProductId::new(1)));

    let change = ctx.store.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(
        change,
        CartChange::AmountUpdated {
            product_id: ProductId::new(1),
            amount: 2
        }
    );

    ctx.store
        .update_product_amount(AmountUpdate::new(ProductId::new(1), 4))
        .await
        .unwrap();
    assert_eq!(ctx.amount_of(1), Some(4));

    let cart = ctx.store.cart();
    let line = cart.find(ProductId::new(1)).unwrap();
    assert_eq!(line.product.title, "Tênis de Caminhada");
    assert_eq!(line.product.price, Decimal::new(1799, 1));
    assert_eq!(cart.subtotal(), Decimal::new(7196, 1));

    let change = ctx.store.remove_product(ProductId::new(1)).await.unwrap();
    assert_eq!(change, CartChange::Removed(ProductId::new(1)));
    assert!(ctx.store.cart().is_empty());

    let notes = ctx.drain_notifications();
    let messages: Vec<_> = notes.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Product added to cart", "Product removed from cart"]
    );
    assert!(notes.iter().all(|n| n.severity == Severity::Success));
}

#[tokio::test]
async fn test_add_accepts_catalog_name_field() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(1, 10).await;
    let _product = ctx
        .server
        .mock("GET", "/products/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "name": "Shoe"}"#)
        .create_async()
        .await;

    ctx.store.add_product(ProductId::new(1)).await.unwrap();

    let cart = ctx.store.cart();
    assert_eq!(cart.len(), 1);
    let line = cart.find(ProductId::new(1)).unwrap();
    assert_eq!(line.product.title, "Shoe");
    assert_eq!(line.product.price, Decimal::ZERO);
    assert_eq!(line.amount, 1);
}

#[tokio::test]
async fn test_add_rejected_when_stock_at_floor() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(2, 1).await;
    let product = ctx
        .server
        .mock("GET", "/products/2")
        .expect(0)
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(2)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::InsufficientStock { available: 1, .. }
    ));
    assert!(ctx.store.cart().is_empty());
    product.assert_async().await;

    let notes = ctx.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert_eq!(notes[0].message, "Requested quantity is out of stock");
}

#[tokio::test]
async fn test_update_beyond_stock_keeps_amount() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(3, 3).await;
    let _product = ctx.mock_product(3, "Bota", "99.5").await;

    ctx.store.add_product(ProductId::new(3)).await.unwrap();
    ctx.drain_notifications();

    let err = ctx
        .store
        .update_product_amount(AmountUpdate::new(ProductId::new(3), 4))
        .await
        .unwrap_err();

    assert!(err.is_rejection());
    assert_eq!(ctx.amount_of(3), Some(1));
    let notes = ctx.drain_notifications();
    assert_eq!(notes[0].message, "Requested quantity is out of stock");
}

#[tokio::test]
async fn test_remove_missing_line_fails() {
    let mut ctx = TestContext::new().await;

    let err = ctx.store.remove_product(ProductId::new(7)).await.unwrap_err();

    assert!(matches!(err, CartError::LineNotFound(id) if id == ProductId::new(7)));
    let notes = ctx.drain_notifications();
    assert_eq!(notes[0].message, "Failed to remove product");
}

// =============================================================================
// Gateway failures
// =============================================================================

#[tokio::test]
async fn test_stock_not_found() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx
        .server
        .mock("GET", "/stock/9")
        .with_status(404)
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(9)).await.unwrap_err();

    match err {
        CartError::Gateway(ApiError::NotFound(path)) => assert_eq!(path, "/stock/9"),
        other => panic!("unexpected error: {other:?}"),
    }
    let notes = ctx.drain_notifications();
    assert_eq!(notes[0].message, "Failed to add product");
}

#[tokio::test]
async fn test_stock_rate_limited() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx
        .server
        .mock("GET", "/stock/1")
        .with_status(429)
        .with_header("Retry-After", "30")
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Gateway(ApiError::RateLimited(30))));
}

#[tokio::test]
async fn test_server_error_status() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx
        .server
        .mock("GET", "/stock/1")
        .with_status(500)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    match err {
        CartError::Gateway(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ctx.store.cart().is_empty());
}

#[tokio::test]
async fn test_malformed_stock_body() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx
        .server
        .mock("GET", "/stock/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "amount": "#)
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Gateway(ApiError::Parse(_))));
}

#[tokio::test]
async fn test_catalog_returning_other_product() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(1, 5).await;
    let _product = ctx
        .server
        .mock("GET", "/products/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 2, "title": "Bota", "price": 10}"#)
        .create_async()
        .await;

    let err = ctx.store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Gateway(ApiError::UnexpectedProduct { .. })
    ));
    assert!(ctx.store.cart().is_empty());
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_catalog_cached_but_stock_is_not() {
    let mut ctx = TestContext::new().await;
    let stock = ctx
        .server
        .mock("GET", "/stock/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "amount": 5}"#)
        .expect(2)
        .create_async()
        .await;
    let product = ctx
        .server
        .mock("GET", "/products/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "title": "Tênis", "price": 50}"#)
        .expect(1)
        .create_async()
        .await;

    ctx.store.add_product(ProductId::new(1)).await.unwrap();
    ctx.store.remove_product(ProductId::new(1)).await.unwrap();
    ctx.store.add_product(ProductId::new(1)).await.unwrap();

    stock.assert_async().await;
    product.assert_async().await;
    assert_eq!(ctx.amount_of(1), Some(1));
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscriber_sees_committed_cart() {
    let mut ctx = TestContext::new().await;
    let _stock = ctx.mock_stock(1, 5).await;
    let _product = ctx.mock_product(1, "Tênis", "50").await;

    let mut rx = ctx.store.subscribe();
    ctx.store.add_product(ProductId::new(1)).await.unwrap();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().item_count(), 1);
}

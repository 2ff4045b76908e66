//! Integration tests for authenticated reviews and order history.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use serde_json::json;
use shopfront_core::{OrderId, ProductId};
use shopfront_integration_tests::{TestContext, product_json};
use shopfront_storefront::error::AppError;
use shopfront_storefront::services::{PROFILE_RECENT_ORDERS, ValidationError};

async fn signed_in(products: Vec<serde_json::Value>) -> TestContext {
    let mut test = TestContext::new(products).await;
    test.api
        .add_user("user-1", "Jane Doe", "jane@example.com", "hunter22");
    test.ctx
        .auth()
        .login("jane@example.com", &SecretString::from("hunter22".to_string()))
        .await
        .unwrap();
    test
}

fn order(id: &str, created_at: &str, total: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "orderItems": [{
            "name": "Camera",
            "qty": 1,
            "image": "/images/cam.jpg",
            "price": total,
            "product": "cam"
        }],
        "shippingAddress": {
            "address": "1 Main St",
            "city": "Springfield",
            "postalCode": "12345",
            "country": "US"
        },
        "paymentMethod": "PayPal",
        "itemsPrice": total,
        "taxPrice": "0.00",
        "shippingPrice": "0.00",
        "totalPrice": total,
        "isPaid": true,
        "paidAt": created_at,
        "isDelivered": false,
        "createdAt": created_at
    })
}

#[tokio::test]
async fn test_review_requires_sign_in() {
    let test = TestContext::new(vec![product_json("cam", "Camera", "89.99", 3)]).await;

    let err = test
        .ctx
        .reviews()
        .submit(&ProductId::new("cam"), 5, "Sharp pictures")
        .await
        .unwrap_err();

    let AppError::AuthRequired { redirect } = err else {
        panic!("expected AuthRequired");
    };
    assert_eq!(redirect.href(), "/login?redirect=%2Fproduct%2Fcam");
    assert!(test.api.requests_to("/api/products/cam/reviews").is_empty());
}

#[tokio::test]
async fn test_review_refreshes_cached_product() {
    let test = signed_in(vec![product_json("cam", "Camera", "89.99", 3)]).await;
    let id = ProductId::new("cam");

    let before = test.ctx.catalog().product(&id).await.unwrap();
    assert!(before.reviews.is_empty());

    let after = test
        .ctx
        .reviews()
        .submit(&id, 4, "  Sharp pictures  ")
        .await
        .unwrap();
    assert_eq!(after.num_reviews, 1);
    assert_eq!(after.reviews[0].name, "Jane Doe");
    assert_eq!(after.reviews[0].comment, "Sharp pictures");

    // The cached copy was dropped, so detail reads the reviewed product.
    let detail = test.ctx.catalog().product(&id).await.unwrap();
    assert_eq!(detail, after);
    assert_eq!(test.api.requests_to("/api/products/cam").len(), 2);
}

#[tokio::test]
async fn test_duplicate_review_shows_server_message() {
    let test = signed_in(vec![product_json("cam", "Camera", "89.99", 3)]).await;
    let id = ProductId::new("cam");

    test.ctx.reviews().submit(&id, 5, "Great").await.unwrap();
    let err = test
        .ctx
        .reviews()
        .submit(&id, 1, "Changed my mind")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Api(_)));
    assert_eq!(err.user_message(), "Product already reviewed");
}

#[tokio::test]
async fn test_review_validation_happens_before_request() {
    let test = signed_in(vec![product_json("cam", "Camera", "89.99", 3)]).await;
    let id = ProductId::new("cam");

    let err = test.ctx.reviews().submit(&id, 0, "Hmm").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::RatingOutOfRange { rating: 0, .. })
    ));

    let err = test.ctx.reviews().submit(&id, 3, "   ").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::Required("Comment"))
    ));

    assert!(test.api.requests_to("/api/products/cam/reviews").is_empty());
}

#[tokio::test]
async fn test_orders_require_sign_in() {
    let test = TestContext::new(Vec::new()).await;

    let err = test.ctx.orders().my_orders().await.unwrap_err();
    let AppError::AuthRequired { redirect } = err else {
        panic!("expected AuthRequired");
    };
    assert_eq!(redirect.href(), "/login?redirect=%2Fmyorders");

    let err = test.ctx.orders().recent(3).await.unwrap_err();
    let AppError::AuthRequired { redirect } = err else {
        panic!("expected AuthRequired");
    };
    assert_eq!(redirect.href(), "/login?redirect=%2Fprofile");
}

#[tokio::test]
async fn test_recent_orders_newest_first() {
    let test = signed_in(Vec::new()).await;
    test.api
        .add_order("user-1", order("o1", "2024-03-01T10:00:00Z", "10.00"));
    test.api
        .add_order("user-1", order("o2", "2024-05-01T10:00:00Z", "20.00"));
    test.api
        .add_order("user-1", order("o3", "2024-01-01T10:00:00Z", "30.00"));
    test.api
        .add_order("user-1", order("o4", "2024-04-01T10:00:00Z", "40.00"));
    test.api
        .add_order("user-2", order("o5", "2024-06-01T10:00:00Z", "50.00"));

    let all = test.ctx.orders().my_orders().await.unwrap();
    assert_eq!(all.len(), 4);

    let recent = test.ctx.orders().recent(PROFILE_RECENT_ORDERS).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o2", "o4", "o1"]);
}

#[tokio::test]
async fn test_order_detail() {
    let test = signed_in(Vec::new()).await;
    test.api
        .add_order("user-1", order("o1", "2024-03-01T10:00:00Z", "89.99"));

    let detail = test.ctx.orders().order(&OrderId::new("o1")).await.unwrap();
    assert_eq!(detail.total_price.to_string(), "$89.99");
    assert_eq!(detail.order_items.len(), 1);
    assert!(detail.is_paid);
    assert!(!detail.is_delivered);
    assert_eq!(detail.shipping_address.unwrap().city, "Springfield");

    let err = test
        .ctx
        .orders()
        .order(&OrderId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

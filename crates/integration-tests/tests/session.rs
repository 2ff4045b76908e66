//! Integration tests for sign-in state and cart persistence across restarts.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::Value;
use shopfront_core::{CartError, ProductId};
use shopfront_integration_tests::{TestContext, phones, product_json};
use shopfront_storefront::error::AppError;
use shopfront_storefront::listing::Location;
use shopfront_storefront::services::{ProfileUpdate, ValidationError};

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn stored(test: &TestContext, key: &str) -> Option<Value> {
    let raw = std::fs::read_to_string(test.state_dir().join(format!("{key}.json"))).ok()?;
    Some(serde_json::from_str(&raw).unwrap())
}

#[tokio::test]
async fn test_login_persists_identity_across_restart() {
    let mut test = TestContext::new(Vec::new()).await;
    test.api
        .add_user("user-1", "Jane Doe", "jane@example.com", "hunter22");

    let identity = test
        .ctx
        .auth()
        .login("jane@example.com", &secret("hunter22"))
        .await
        .unwrap();
    assert_eq!(identity.name, "Jane Doe");

    let persisted = stored(&test, "userInfo").unwrap();
    assert_eq!(persisted["email"], "jane@example.com");
    assert_eq!(persisted["favoriteColor"], "teal");

    let restarted = test.restart();
    let rehydrated = restarted.store().user_info().unwrap();
    assert_eq!(rehydrated, &identity);
    assert_eq!(rehydrated.token.as_deref(), Some("token-user-1"));
    assert_eq!(rehydrated.extra["favoriteColor"], "teal");
}

#[tokio::test]
async fn test_bad_credentials_leave_session_untouched() {
    let mut test = TestContext::new(Vec::new()).await;
    test.api
        .add_user("user-1", "Jane Doe", "jane@example.com", "hunter22");

    let err = test
        .ctx
        .auth()
        .login("jane@example.com", &secret("wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(test.ctx.store().user_info().is_none());
    assert!(stored(&test, "userInfo").is_none());
}

#[tokio::test]
async fn test_malformed_email_never_reaches_the_api() {
    let mut test = TestContext::new(Vec::new()).await;

    let err = test
        .ctx
        .auth()
        .login("not-an-email", &secret("hunter22"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ValidationError::Email(_))));
    assert!(test.api.requests().is_empty());
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let mut test = TestContext::new(Vec::new()).await;

    let err = test
        .ctx
        .auth()
        .register("Sam", "sam@example.com", &secret("abc123"), &secret("abc124"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::PasswordMismatch)
    ));
    assert!(test.api.requests_to("/api/users").is_empty());
    assert!(test.ctx.store().user_info().is_none());
}

#[tokio::test]
async fn test_register_then_update_profile() {
    let mut test = TestContext::new(Vec::new()).await;

    let identity = test
        .ctx
        .auth()
        .register("Sam", "sam@example.com", &secret("abc123"), &secret("abc123"))
        .await
        .unwrap();
    assert_eq!(identity.name, "Sam");
    assert_eq!(test.ctx.store().user_info(), Some(&identity));

    let updated = test
        .ctx
        .auth()
        .update_profile(ProfileUpdate {
            name: "Samantha",
            email: "sam@example.com",
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Samantha");
    assert_eq!(updated.id, identity.id);

    let restarted = test.restart();
    assert_eq!(restarted.store().user_info().unwrap().name, "Samantha");
    assert_eq!(test.api.requests_to("/api/users/profile").len(), 1);
}

#[tokio::test]
async fn test_update_profile_requires_sign_in() {
    let mut test = TestContext::new(Vec::new()).await;

    let err = test
        .ctx
        .auth()
        .update_profile(ProfileUpdate {
            name: "Sam",
            email: "sam@example.com",
            ..ProfileUpdate::default()
        })
        .await
        .unwrap_err();

    match err {
        AppError::AuthRequired { redirect } => {
            assert_eq!(redirect.href(), "/login?redirect=%2Fprofile");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(test.api.requests().is_empty());
}

#[tokio::test]
async fn test_signed_in_user_skips_login_form() {
    let mut test = TestContext::new(Vec::new()).await;
    test.api
        .add_user("user-1", "Jane Doe", "jane@example.com", "hunter22");

    let form = Location::parse("/login?redirect=%2Fshipping");
    assert!(test.ctx.auth().redirect_if_signed_in(&form).is_none());

    test.ctx
        .auth()
        .login("jane@example.com", &secret("hunter22"))
        .await
        .unwrap();

    let target = test.ctx.auth().redirect_if_signed_in(&form).unwrap();
    assert_eq!(target.href(), "/shipping");
}

#[tokio::test]
async fn test_cart_persists_across_restart() {
    let mut test = TestContext::new(vec![product_json("cam", "Camera", "89.99", 5)]).await;
    let id = ProductId::new("cam");
    let product = test.ctx.catalog().product(&id).await.unwrap();

    test.ctx.cart().add(&product, 2).unwrap();
    let line = test.ctx.cart().add(&product, 2).unwrap();
    assert_eq!(line.qty, 4);

    let err = test.ctx.cart().add(&product, 2).unwrap_err();
    assert!(matches!(
        err,
        AppError::Cart(CartError::OutOfStock {
            requested: 6,
            available: 5
        })
    ));
    assert_eq!(err.user_message(), "Sorry. Product is out of stock");

    let restarted = test.restart();
    let cart = restarted.store().cart();
    assert_eq!(cart.cart_items.len(), 1);
    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.subtotal().to_string(), "$359.96");
}

#[tokio::test]
async fn test_logout_clears_identity_and_cart() {
    let mut test = TestContext::new(phones(2)).await;
    test.api
        .add_user("user-1", "Jane Doe", "jane@example.com", "hunter22");

    test.ctx
        .auth()
        .login("jane@example.com", &secret("hunter22"))
        .await
        .unwrap();
    let product = test
        .ctx
        .catalog()
        .product(&ProductId::new("phone-1"))
        .await
        .unwrap();
    test.ctx.cart().add(&product, 1).unwrap();

    test.ctx.auth().logout().unwrap();

    assert!(test.ctx.store().user_info().is_none());
    assert!(test.ctx.store().cart().is_empty());
    assert!(stored(&test, "userInfo").is_none());
    assert_eq!(stored(&test, "cartItems").unwrap(), serde_json::json!([]));

    let restarted = test.restart();
    assert!(restarted.store().user_info().is_none());
    assert!(restarted.store().cart().is_empty());
}

#[tokio::test]
async fn test_malformed_state_rehydrates_empty() {
    let test = TestContext::new(Vec::new()).await;
    std::fs::write(test.state_dir().join("cartItems.json"), "{not json").unwrap();
    std::fs::write(test.state_dir().join("userInfo.json"), "[]").unwrap();

    let restarted = test.restart();
    assert!(restarted.store().cart().is_empty());
    assert!(restarted.store().user_info().is_none());
}

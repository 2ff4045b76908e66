//! Integration tests for listing, search, pagination and product detail.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use shopfront_core::ProductId;
use shopfront_integration_tests::{TestContext, phones, product_json};
use shopfront_storefront::api::ApiError;
use shopfront_storefront::config::ClientConfig;
use shopfront_storefront::error::AppError;
use shopfront_storefront::listing::{History, ListView, Location, PageError, Phase};
use shopfront_storefront::state::AppContext;

async fn run(view: &mut ListView, test: &TestContext, history: &History) {
    view.load(test.ctx.api(), history.current()).await;
}

#[tokio::test]
async fn test_search_and_paginate_through_url() {
    let test = TestContext::new(phones(17)).await;
    let mut view = test.ctx.list_view();
    let mut history = History::default();

    let ticket = view.submit_search("phone", &mut history).unwrap();
    let fetched = ListView::fetch(test.ctx.api(), ticket).await;
    view.complete(fetched);

    assert_eq!(view.phase(), Phase::Success);
    assert_eq!(view.total_count(), 17);
    assert_eq!(view.total_pages(), 3);
    assert_eq!(view.products().len(), 8);
    assert_eq!(history.current().href(), "/?keyword=phone");

    let ticket = view.request_page(3, &mut history).unwrap().unwrap();
    let fetched = ListView::fetch(test.ctx.api(), ticket).await;
    view.complete(fetched);

    assert_eq!(view.current_page(), 3);
    assert_eq!(view.products().len(), 1);
    assert_eq!(history.current().href(), "/?keyword=phone&page=3");

    let last = test.api.requests_to("/api/products").pop().unwrap();
    assert_eq!(last.query.get("keyword").map(String::as_str), Some("phone"));
    assert_eq!(last.query.get("page").map(String::as_str), Some("3"));
    assert_eq!(last.query.get("limit").map(String::as_str), Some("8"));
    let request_id = last.request_id.unwrap();
    assert!(uuid::Uuid::parse_str(&request_id).is_ok());
}

#[tokio::test]
async fn test_out_of_range_page_issues_no_request() {
    let test = TestContext::new(phones(17)).await;
    let mut view = test.ctx.list_view();
    let mut history = History::new(Location::parse("/?keyword=phone"));
    run(&mut view, &test, &history).await;

    let before = test.api.requests_to("/api/products").len();
    for page in [0, 4] {
        assert_eq!(
            view.request_page(page, &mut history),
            Err(PageError::OutOfRange {
                requested: page,
                total_pages: 3
            })
        );
    }

    assert_eq!(test.api.requests_to("/api/products").len(), before);
    assert_eq!(history.current().href(), "/?keyword=phone");
    assert_eq!(view.current_page(), 1);
}

#[tokio::test]
async fn test_back_navigation_reloads_previous_page() {
    let test = TestContext::new(phones(17)).await;
    let mut view = test.ctx.list_view();
    let mut history = History::default();
    run(&mut view, &test, &history).await;
    assert_eq!(view.heading(), "Latest Products");

    let ticket = view.request_page(2, &mut history).unwrap().unwrap();
    let fetched = ListView::fetch(test.ctx.api(), ticket).await;
    view.complete(fetched);
    assert_eq!(view.products()[0].id, ProductId::new("phone-9"));

    assert!(history.back());
    run(&mut view, &test, &history).await;
    assert_eq!(view.current_page(), 1);
    assert_eq!(view.products()[0].id, ProductId::new("phone-1"));
}

#[tokio::test]
async fn test_failed_search_is_retried_on_resubmit() {
    let test = TestContext::new(phones(17)).await;
    test.api.fail_listings(1);
    let mut view = test.ctx.list_view();
    let mut history = History::default();

    let ticket = view.submit_search("phone", &mut history).unwrap();
    view.complete(ListView::fetch(test.ctx.api(), ticket).await);
    assert_eq!(view.phase(), Phase::Failed);
    assert_eq!(view.error(), Some("Database unavailable"));

    let ticket = view.submit_search("phone", &mut history).unwrap();
    assert_eq!(view.error(), None);
    view.complete(ListView::fetch(test.ctx.api(), ticket).await);

    assert_eq!(view.phase(), Phase::Success);
    assert_eq!(view.total_pages(), 3);
    assert_eq!(test.api.requests_to("/api/products").len(), 2);
    assert_eq!(history.current().href(), "/?keyword=phone");
}

#[tokio::test]
async fn test_failed_page_reloads_from_same_url() {
    let test = TestContext::new(phones(17)).await;
    test.api.fail_listings(1);
    let mut view = test.ctx.list_view();
    let history = History::new(Location::parse("/?page=2"));

    run(&mut view, &test, &history).await;
    assert_eq!(view.phase(), Phase::Failed);

    run(&mut view, &test, &history).await;
    assert_eq!(view.phase(), Phase::Success);
    assert_eq!(view.current_page(), 2);
    assert_eq!(view.products()[0].id, ProductId::new("phone-9"));
}

#[tokio::test]
async fn test_search_without_matches() {
    let test = TestContext::new(phones(3)).await;
    let mut view = test.ctx.list_view();
    run(&mut view, &test, &History::new(Location::parse("/?keyword=laptop"))).await;

    assert_eq!(view.phase(), Phase::Success);
    assert!(view.products().is_empty());
    assert_eq!(view.total_pages(), 1);
    assert_eq!(view.heading(), "No products found for \"laptop\"");
}

#[tokio::test]
async fn test_legacy_list_shape_is_a_single_page() {
    let test = TestContext::new(phones(5)).await;
    test.api.use_legacy_list();

    let mut view = test.ctx.list_view();
    run(&mut view, &test, &History::default()).await;

    assert_eq!(view.phase(), Phase::Success);
    assert_eq!(view.products().len(), 5);
    assert_eq!(view.current_page(), 1);
    assert_eq!(view.total_pages(), 1);
    assert_eq!(view.total_count(), 5);
}

#[tokio::test]
async fn test_product_detail_is_cached() {
    let test = TestContext::new(vec![product_json("p1", "Camera", "499.00", 2)]).await;
    let id = ProductId::new("p1");

    let first = test.ctx.catalog().product(&id).await.unwrap();
    let second = test.ctx.catalog().product(&id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.name, "Camera");
    assert_eq!(test.api.requests_to("/api/products/p1").len(), 1);
}

#[tokio::test]
async fn test_unknown_product_uses_server_message() {
    let test = TestContext::new(Vec::new()).await;

    let response = reqwest::get(format!("{}/api/products/nope", test.api.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let err = test
        .ctx
        .api()
        .get_product(&ProductId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Product not found"));

    let err = test
        .ctx
        .catalog()
        .product(&ProductId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_unreachable_api_fails_the_view() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = ClientConfig::for_api("http://127.0.0.1:9", dir.path()).unwrap();
    let ctx = AppContext::new(config).unwrap();

    let mut view = ctx.list_view();
    view.load(ctx.api(), &Location::root()).await;

    assert_eq!(view.phase(), Phase::Failed);
    assert!(view.products().is_empty());
    assert_eq!(view.error(), Some("Network error, check your connection"));
}

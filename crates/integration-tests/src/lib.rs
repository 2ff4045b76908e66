//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! No external services are needed: [`MockApi`] serves the storefront REST
//! API in-process on an ephemeral port, and [`TestContext`] points an
//! [`AppContext`] at it with state persisted in a temporary directory.
//!
//! # Test Categories
//!
//! - `catalog` - Listing, search, pagination and product detail
//! - `session` - Login, registration, profile and cart persistence
//! - `reviews_orders` - Authenticated reviews and order history
//! - `stale_responses` - Out-of-order list responses

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use shopfront_storefront::config::ClientConfig;
use shopfront_storefront::state::AppContext;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Token the mock issues for a user id.
#[must_use]
pub fn token_for(user_id: &str) -> String {
    format!("token-{user_id}")
}

/// A catalog product document.
#[must_use]
pub fn product_json(id: &str, name: &str, price: &str, count_in_stock: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "image": format!("/images/{id}.jpg"),
        "brand": "Acme",
        "category": "Electronics",
        "description": format!("{name} description"),
        "price": price,
        "countInStock": count_in_stock,
        "rating": 0,
        "numReviews": 0,
        "reviews": []
    })
}

/// `n` products named "Phone 1".."Phone n", all in stock.
#[must_use]
pub fn phones(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| product_json(&format!("phone-{i}"), &format!("Phone {i}"), "199.99", 5))
        .collect()
}

// =============================================================================
// Mock API
// =============================================================================

#[derive(Debug, Clone)]
struct MockUser {
    id: String,
    name: String,
    email: String,
    password: String,
}

impl MockUser {
    fn identity(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "isAdmin": false,
            "token": token_for(&self.id),
            "createdAt": "2024-01-15T10:00:00Z",
            "favoriteColor": "teal"
        })
    }
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<Value>>,
    users: Mutex<Vec<MockUser>>,
    orders: Mutex<Vec<(String, Value)>>,
    page_delays: Mutex<HashMap<u32, Duration>>,
    legacy_list: Mutex<bool>,
    listing_failures: Mutex<u32>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockState {
    fn record(&self, path: &str, query: &HashMap<String, String>, headers: &HeaderMap) {
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        self.requests.lock().unwrap().push(Recorded {
            path: path.to_string(),
            query: query.clone(),
            request_id,
        });
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<MockUser, Response> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authorized, no token"))?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| token_for(&u.id) == token)
            .cloned()
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// In-process storefront API.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockApi {
    /// Serve `products` on an ephemeral local port.
    pub async fn start(products: Vec<Value>) -> Self {
        let state = Arc::new(MockState {
            products: Mutex::new(products),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/api/products/{id}/reviews", post(create_review))
            .route("/api/users", post(register))
            .route("/api/users/login", post(login))
            .route("/api/users/profile", put(update_profile))
            .route("/api/orders/myorders", get(my_orders))
            .route("/api/orders/{id}", get(get_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the mock.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register an account that can log in.
    pub fn add_user(&self, id: &str, name: &str, email: &str, password: &str) {
        self.state.users.lock().unwrap().push(MockUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Add an order visible to `user_id`.
    pub fn add_order(&self, user_id: &str, order: Value) {
        self.state
            .orders
            .lock()
            .unwrap()
            .push((user_id.to_string(), order));
    }

    /// Delay responses for listing page `page`.
    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.state.page_delays.lock().unwrap().insert(page, delay);
    }

    /// Answer listings with a bare product array instead of a page object.
    pub fn use_legacy_list(&self) {
        *self.state.legacy_list.lock().unwrap() = true;
    }

    /// Answer the next `count` listing requests with a server error.
    pub fn fail_listings(&self, count: u32) {
        *self.state.listing_failures.lock().unwrap() = count;
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record("/api/products", &query, &headers);

    let keyword = query
        .get("keyword")
        .map(|k| k.to_lowercase())
        .unwrap_or_default();
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(8);

    let delay = state
        .page_delays
        .lock()
        .unwrap()
        .get(&u32::try_from(page).unwrap_or(u32::MAX))
        .copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    {
        let mut failures = state.listing_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    }

    let matching: Vec<Value> = state
        .products
        .lock()
        .unwrap()
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&keyword))
        })
        .cloned()
        .collect();

    if *state.legacy_list.lock().unwrap() {
        return Json(Value::Array(matching)).into_response();
    }

    let total = matching.len();
    let pages = total.div_ceil(limit).max(1);
    let products: Vec<Value> = matching
        .into_iter()
        .skip(page.saturating_sub(1) * limit)
        .take(limit)
        .collect();
    Json(json!({
        "products": products,
        "page": page,
        "pages": pages,
        "total": total
    }))
    .into_response()
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&format!("/api/products/{id}"), &HashMap::new(), &headers);
    let products = state.products.lock().unwrap();
    products.iter().find(|p| p["_id"] == id.as_str()).map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p.clone()).into_response(),
    )
}

async fn create_review(
    State(state): State<Arc<MockState>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/api/products/{id}/reviews");
    state.record(&path, &HashMap::new(), &headers);
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut products = state.products.lock().unwrap();
    let Some(product) = products.iter_mut().find(|p| p["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let reviews = product["reviews"].as_array_mut().unwrap();
    if reviews.iter().any(|r| r["user"] == user.id.as_str()) {
        return error(StatusCode::BAD_REQUEST, "Product already reviewed");
    }

    reviews.push(json!({
        "_id": format!("review-{}", reviews.len() + 1),
        "name": user.name,
        "rating": body["rating"],
        "comment": body["comment"],
        "user": user.id,
        "createdAt": "2024-02-01T12:00:00Z"
    }));
    let count = reviews.len();
    let sum: u64 = reviews.iter().filter_map(|r| r["rating"].as_u64()).sum();
    #[allow(clippy::cast_precision_loss)]
    let rating = sum as f64 / count as f64;
    product["numReviews"] = json!(count);
    product["rating"] = json!(rating);

    (StatusCode::CREATED, Json(json!({ "message": "Review added" }))).into_response()
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/users/login", &HashMap::new(), &headers);
    let users = state.users.lock().unwrap();
    users
        .iter()
        .find(|u| body["email"] == u.email.as_str() && body["password"] == u.password.as_str())
        .map_or_else(
            || error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            |u| Json(u.identity()).into_response(),
        )
}

async fn register(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/users", &HashMap::new(), &headers);
    let mut users = state.users.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if users.iter().any(|u| u.email == email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }

    let user = MockUser {
        id: format!("user-{}", users.len() + 1),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
    };
    let identity = user.identity();
    users.push(user);
    (StatusCode::CREATED, Json(identity)).into_response()
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/users/profile", &HashMap::new(), &headers);
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut users = state.users.lock().unwrap();
    let Some(stored) = users.iter_mut().find(|u| u.id == user.id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(name) = body["name"].as_str() {
        stored.name = name.to_string();
    }
    if let Some(email) = body["email"].as_str() {
        stored.email = email.to_string();
    }
    if let Some(password) = body["password"].as_str() {
        stored.password = password.to_string();
    }
    Json(stored.identity()).into_response()
}

async fn my_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("/api/orders/myorders", &HashMap::new(), &headers);
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let orders: Vec<Value> = state
        .orders
        .lock()
        .unwrap()
        .iter()
        .filter(|(owner, _)| *owner == user.id)
        .map(|(_, order)| order.clone())
        .collect();
    Json(Value::Array(orders)).into_response()
}

async fn get_order(
    State(state): State<Arc<MockState>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&format!("/api/orders/{id}"), &HashMap::new(), &headers);
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state
        .orders
        .lock()
        .unwrap()
        .iter()
        .find(|(owner, order)| *owner == user.id && order["_id"] == id.as_str())
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Order not found"),
            |(_, order)| Json(order.clone()).into_response(),
        )
}

// =============================================================================
// Test context
// =============================================================================

/// A storefront context wired to a [`MockApi`], with its own state directory.
pub struct TestContext {
    pub api: MockApi,
    pub ctx: AppContext,
    dir: TempDir,
}

impl TestContext {
    /// Start a mock serving `products` and a context pointed at it.
    pub async fn new(products: Vec<Value>) -> Self {
        let api = MockApi::start(products).await;
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(Self::config_for(&api, dir.path())).unwrap();
        Self { api, ctx, dir }
    }

    /// Configuration for a client of `api` persisting under `state_dir`.
    #[must_use]
    pub fn config_for(api: &MockApi, state_dir: &Path) -> ClientConfig {
        let mut config = ClientConfig::for_api(&api.url(), state_dir).unwrap();
        config.request_timeout = Duration::from_secs(5);
        config
    }

    /// Simulate a restart: a fresh context over the same state directory.
    #[must_use]
    pub fn restart(&self) -> AppContext {
        AppContext::new(Self::config_for(&self.api, self.dir.path())).unwrap()
    }

    /// Directory holding persisted state.
    #[must_use]
    pub fn state_dir(&self) -> &Path {
        self.dir.path()
    }
}

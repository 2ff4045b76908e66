//! HTTP client for the storefront REST API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shopfront_core::{Identity, Order, OrderId, Product, ProductId, ProductPage};
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::ApiError;
use super::cache::{ProductCache, product_cache};
use super::types::{
    ErrorBody, LoginRequest, ProductListResponse, ProductQuery, ProfileUpdateRequest,
    RegisterRequest, ReviewRequest,
};
use crate::config::ClientConfig;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest slice of an error body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool, cookie jar and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    products: ProductCache,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached_products", &self.inner.products.entry_count())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                api_token: config.api_token.clone(),
                products: product_cache(),
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn request(&self, method: Method, url: Url, auth: Option<&Identity>) -> RequestBuilder {
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        let token = auth
            .and_then(|identity| identity.token.as_deref())
            .or_else(|| self.inner.api_token.as_ref().map(|t| t.expose_secret()));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode a JSON response body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        // An empty 2xx body decodes as JSON null
        let body = if body.trim().is_empty() {
            "null".to_string()
        } else {
            body
        };

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch one page of the product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body has neither the
    /// paginated nor the legacy array shape.
    #[instrument(skip(self), fields(keyword = %query.keyword, page = query.page))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let mut url = self.endpoint("/api/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.keyword.is_empty() {
                pairs.append_pair("keyword", &query.keyword);
            }
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("limit", &query.limit.to_string());
        }

        let response: ProductListResponse = self.send(self.request(Method::GET, url, None)).await?;
        let page = response.into_page(query.page);
        debug!(
            count = page.products.len(),
            total = page.total,
            "Fetched product page"
        );
        Ok(page)
    }

    /// Fetch a product with its reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        // Check cache
        if let Some(product) = self.inner.products.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint(&format!("/api/products/{}", path_segment(id.as_str())))?;
        let product: Product = self.send(self.request(Method::GET, url, None)).await?;

        // Cache the result
        self.inner.products.insert(id.clone(), product.clone()).await;
        Ok(product)
    }

    /// Drop any cached copy of a product so the next fetch goes to the API.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner.products.invalidate(id).await;
    }

    /// Post a review for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the review (e.g. not signed in,
    /// already reviewed) or the request fails.
    #[instrument(skip(self, comment, auth), fields(product_id = %id))]
    pub async fn create_review(
        &self,
        id: &ProductId,
        rating: u8,
        comment: &str,
        auth: Option<&Identity>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!(
            "/api/products/{}/reviews",
            path_segment(id.as_str())
        ))?;
        let request = self
            .request(Method::POST, url, auth)
            .json(&ReviewRequest { rating, comment });

        // The body is an acknowledgement message only.
        let _: serde_json::Value = self.send(request).await?;
        self.invalidate_product(id).await;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for an identity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, ApiError> {
        let url = self.endpoint("/api/users/login")?;
        let request = self.request(Method::POST, url, None).json(&LoginRequest {
            email,
            password: password.expose_secret(),
        });
        self.send(request).await
    }

    /// Create an account and return its identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the account already exists or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, ApiError> {
        let url = self.endpoint("/api/users")?;
        let request = self.request(Method::POST, url, None).json(&RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        });
        self.send(request).await
    }

    /// Update name, email and optionally the password of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not authenticated or the request fails.
    #[instrument(skip(self, password, auth))]
    pub async fn update_profile(
        &self,
        name: &str,
        email: &str,
        password: Option<&SecretString>,
        auth: Option<&Identity>,
    ) -> Result<Identity, ApiError> {
        let url = self.endpoint("/api/users/profile")?;
        let request = self
            .request(Method::PUT, url, auth)
            .json(&ProfileUpdateRequest {
                name,
                email,
                password: password.map(|p| p.expose_secret()),
            });
        self.send(request).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not authenticated or the request fails.
    #[instrument(skip(self, auth))]
    pub async fn my_orders(&self, auth: Option<&Identity>) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("/api/orders/myorders")?;
        self.send(self.request(Method::GET, url, auth)).await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not visible to this session or the
    /// request fails.
    #[instrument(skip(self, auth), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId, auth: Option<&Identity>) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("/api/orders/{}", path_segment(id.as_str())))?;
        self.send(self.request(Method::GET, url, auth)).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}

/// Map a non-success response to an error, keeping the server's message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    if status.is_server_error() {
        tracing::error!(
            status = %status,
            body = %truncate(body),
            "API returned non-success status"
        );
    } else {
        debug!(status = %status, message = %message, "API rejected request");
    }

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Percent-encode an id for use as a single path segment.
fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

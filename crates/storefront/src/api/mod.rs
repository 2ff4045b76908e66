//! Client for the remote storefront REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the API owns products, orders,
//!   reviews and accounts - the client never syncs them locally
//! - Session cookie kept in the client's cookie jar; a bearer token is sent
//!   when the identity (or configuration) carries one
//! - Every request carries a fresh `x-request-id` and a timeout
//! - Product details cached via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config)?;
//!
//! let page = client.list_products(&ProductQuery::new("phone", 1, 8)).await?;
//! let product = client.get_product(&page.products[0].id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use types::ProductQuery;

use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API refused the credentials (HTTP 401/403).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status, with the server's message when it sent one.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `message` from the JSON error body, or the status reason.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for showing next to the form or list that failed.
    ///
    /// Prefers what the server said; transport details are summarized.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::Status { message, .. } => message.clone(),
            Self::Timeout => "The server took too long to respond".to_string(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            Self::Http(_) => "Network error, check your connection".to_string(),
            Self::Parse(_) | Self::Url(_) => "Unexpected response from server".to_string(),
        }
    }

    /// HTTP status code, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

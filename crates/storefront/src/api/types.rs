//! Request and response bodies exchanged with the remote API.
//!
//! Domain projections (`Product`, `Order`, `Identity`) live in
//! `shopfront_core`; this module only holds wire shapes.

use serde::{Deserialize, Serialize};
use shopfront_core::{Product, ProductPage};

/// Parameters of one product listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub keyword: String,
    pub page: u32,
    pub limit: u32,
}

impl ProductQuery {
    /// Build a query; `page` and `limit` are raised to at least 1.
    #[must_use]
    pub fn new(keyword: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            keyword: keyword.into(),
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Body of `GET /api/products`.
///
/// The paginated object is canonical. Older deployments answer with a bare
/// array, which is treated as a single page holding every match.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductListResponse {
    Paginated {
        products: Vec<Product>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        pages: Option<u32>,
        #[serde(default)]
        total: Option<u64>,
    },
    Legacy(Vec<Product>),
}

impl ProductListResponse {
    /// Normalize either shape into a [`ProductPage`].
    pub(crate) fn into_page(self, requested_page: u32) -> ProductPage {
        match self {
            Self::Paginated {
                products,
                page,
                pages,
                total,
            } => {
                let total = total.unwrap_or(products.len() as u64);
                ProductPage {
                    products,
                    page: page.unwrap_or(requested_page).max(1),
                    pages,
                    total,
                }
            }
            Self::Legacy(products) => ProductPage {
                total: products.len() as u64,
                products,
                page: 1,
                pages: Some(1),
            },
        }
    }
}

/// Body of `POST /api/users/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/users`.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `PUT /api/users/profile`. An absent password leaves it unchanged.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpdateRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

/// Body of `POST /api/products/:id/reviews`.
#[derive(Debug, Serialize)]
pub(crate) struct ReviewRequest<'a> {
    pub rating: u8,
    pub comment: &'a str,
}

/// Error body the API sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

//! Product detail lookups.

use shopfront_core::{Product, ProductId};

use crate::api::{ApiClient, ApiError};
use crate::error::{AppError, Result};

pub struct CatalogService<'a> {
    api: &'a ApiClient,
}

impl<'a> CatalogService<'a> {
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// A product with its reviews. Served from cache for five minutes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown product and
    /// `AppError::Api` for other failures.
    pub async fn product(&self, id: &ProductId) -> Result<Product> {
        match self.api.get_product(id).await {
            Ok(product) => Ok(product),
            Err(ApiError::NotFound(_)) => Err(AppError::NotFound(format!("product {id}"))),
            Err(e) => Err(e.into()),
        }
    }
}

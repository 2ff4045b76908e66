//! Product reviews.

use shopfront_core::{Product, ProductId};
use tracing::info;

use crate::api::ApiClient;
use crate::error::{Result, add_breadcrumb};
use crate::routes::Route;
use crate::session::Store;

use super::{require_identity, validation};

pub struct ReviewService<'a> {
    api: &'a ApiClient,
    store: &'a Store,
}

impl<'a> ReviewService<'a> {
    pub const fn new(api: &'a ApiClient, store: &'a Store) -> Self {
        Self { api, store }
    }

    /// Post a review and return the product as it now reads, reviews included.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthRequired` (returning to the product page)
    /// without an identity, `AppError::Validation` for a rating outside
    /// `1..=5` or a blank comment, and `AppError::Api` if the API refuses,
    /// for example because the user already reviewed the product.
    pub async fn submit(&self, product: &ProductId, rating: u8, comment: &str) -> Result<Product> {
        let identity = require_identity(self.store, &Route::Product(product.clone()))?;
        let rating = validation::rating(rating)?;
        let comment = validation::required("Comment", comment)?;

        self.api
            .create_review(product, rating, comment, Some(identity))
            .await?;
        add_breadcrumb(
            "review",
            "Submitted review",
            Some(&[("product_id", product.as_str())]),
        );
        info!(product_id = %product, rating, "Review submitted");

        Ok(self.api.get_product(product).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::AppError;
    use crate::services::ValidationError;
    use crate::session::Action;
    use crate::storage::MemoryStore;

    fn api() -> ApiClient {
        let config = ClientConfig::for_api("http://127.0.0.1:9", "/tmp/unused").unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_review_without_identity_requires_login() {
        let api = api();
        let store = Store::hydrate(Box::new(MemoryStore::new()));
        let err = ReviewService::new(&api, &store)
            .submit(&ProductId::new("p1"), 5, "Great")
            .await
            .unwrap_err();

        let AppError::AuthRequired { redirect } = err else {
            panic!("expected auth required");
        };
        assert_eq!(redirect.href(), "/login?redirect=%2Fproduct%2Fp1");
    }

    #[tokio::test]
    async fn test_review_validates_rating_and_comment() {
        let api = api();
        let mut store = Store::hydrate(Box::new(MemoryStore::new()));
        let identity = serde_json::from_value(serde_json::json!({
            "_id": "u1", "name": "Ada", "email": "ada@example.com"
        }))
        .unwrap();
        store.dispatch(Action::UserLogin(identity)).unwrap();

        let reviews = ReviewService::new(&api, &store);
        let id = ProductId::new("p1");
        assert!(matches!(
            reviews.submit(&id, 0, "Fine").await,
            Err(AppError::Validation(ValidationError::RatingOutOfRange { .. }))
        ));
        assert!(matches!(
            reviews.submit(&id, 4, "   ").await,
            Err(AppError::Validation(ValidationError::Required("Comment")))
        ));
    }
}

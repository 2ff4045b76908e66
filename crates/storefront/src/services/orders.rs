//! Order history for the signed-in user.

use shopfront_core::types::order::most_recent;
use shopfront_core::{Order, OrderId};

use crate::api::{ApiClient, ApiError};
use crate::error::{AppError, Result};
use crate::routes::Route;
use crate::session::Store;

use super::require_identity;

/// Orders shown on the profile page.
pub const PROFILE_RECENT_ORDERS: usize = 3;

pub struct OrderService<'a> {
    api: &'a ApiClient,
    store: &'a Store,
}

impl<'a> OrderService<'a> {
    pub const fn new(api: &'a ApiClient, store: &'a Store) -> Self {
        Self { api, store }
    }

    /// Every order of the signed-in user, in API order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthRequired` without an identity and
    /// `AppError::Api` if the request fails.
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        let identity = require_identity(self.store, &Route::MyOrders)?;
        Ok(self.api.my_orders(Some(identity)).await?)
    }

    /// The `n` newest orders, newest first by creation date.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthRequired` without an identity and
    /// `AppError::Api` if the request fails; failures are never swallowed.
    pub async fn recent(&self, n: usize) -> Result<Vec<Order>> {
        let identity = require_identity(self.store, &Route::Profile)?;
        let orders = self.api.my_orders(Some(identity)).await?;
        Ok(most_recent(orders, n))
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthRequired` without an identity,
    /// `AppError::NotFound` for an unknown order, and `AppError::Api` for
    /// other failures.
    pub async fn order(&self, id: &OrderId) -> Result<Order> {
        let identity = require_identity(self.store, &Route::Order(id.clone()))?;
        match self.api.get_order(id, Some(identity)).await {
            Ok(order) => Ok(order),
            Err(ApiError::NotFound(_)) => Err(AppError::NotFound(format!("order {id}"))),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_orders_require_identity() {
        let config = ClientConfig::for_api("http://127.0.0.1:9", "/tmp/unused").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let store = Store::hydrate(Box::new(MemoryStore::new()));
        let orders = OrderService::new(&api, &store);

        let redirect = |err: AppError| match err {
            AppError::AuthRequired { redirect } => redirect.href(),
            other => panic!("unexpected {other}"),
        };
        assert_eq!(
            redirect(orders.my_orders().await.unwrap_err()),
            "/login?redirect=%2Fmyorders"
        );
        assert_eq!(
            redirect(orders.recent(PROFILE_RECENT_ORDERS).await.unwrap_err()),
            "/login?redirect=%2Fprofile"
        );
        assert_eq!(
            redirect(orders.order(&OrderId::new("o1")).await.unwrap_err()),
            "/login?redirect=%2Forder%2Fo1"
        );
    }
}

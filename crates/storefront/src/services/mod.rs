//! Business logic services for the storefront client.
//!
//! # Services
//!
//! - `auth` - Login, registration, profile updates and logout
//! - `cart` - Stock-checked cart mutations
//! - `catalog` - Product detail
//! - `orders` - Order history
//! - `reviews` - Review submission
//!
//! Each service borrows what it needs from
//! [`AppContext`](crate::state::AppContext) for the duration of one operation.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod validation;

pub use auth::{AuthService, ProfileUpdate};
pub use cart::{CartService, checkout_location};
pub use catalog::CatalogService;
pub use orders::{OrderService, PROFILE_RECENT_ORDERS};
pub use reviews::ReviewService;
pub use validation::ValidationError;

use shopfront_core::Identity;

use crate::error::{AppError, Result};
use crate::routes::{Route, login_location};
use crate::session::Store;

/// The signed-in identity, or `AuthRequired` returning to `route`.
fn require_identity<'s>(store: &'s Store, route: &Route) -> Result<&'s Identity> {
    store.user_info().ok_or_else(|| AppError::AuthRequired {
        redirect: login_location(&route.path()),
    })
}

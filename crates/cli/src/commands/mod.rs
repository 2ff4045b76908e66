//! Command implementations.
//!
//! Each command acts on the [`AppContext`] and moves the [`Navigator`] to
//! the location a browser would show afterwards, so `next`, `prev` and a
//! post-login redirect pick up where the previous invocation stopped.

pub mod account;
pub mod cart;
pub mod catalog;

use std::path::Path;

use shopfront_core::{OrderId, ProductId};
use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::listing::{History, Location};
use shopfront_storefront::routes::{Access, Route, guard};
use shopfront_storefront::session::SessionError;
use shopfront_storefront::state::AppContext;
use shopfront_storefront::storage::{FileStore, KeyValueStore};

use crate::output;

/// Storage key holding the current location.
pub const LOCATION_KEY: &str = "location";

/// Navigation history whose current entry survives between invocations.
pub struct Navigator {
    storage: FileStore,
    history: History,
}

impl Navigator {
    /// Resume at the location saved in `dir`, or at `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        let storage = FileStore::open(dir)?;
        let current = match storage.get(LOCATION_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Location>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring malformed saved location");
                Location::root()
            }),
            Ok(None) => Location::root(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved location");
                Location::root()
            }
        };

        Ok(Self {
            storage,
            history: History::new(current),
        })
    }

    #[must_use]
    pub const fn current(&self) -> &Location {
        self.history.current()
    }

    pub fn history(&mut self) -> &mut History {
        &mut self.history
    }

    /// Navigate to `location`.
    pub fn go(&mut self, location: Location) {
        if &location != self.history.current() {
            self.history.push(location);
        }
    }

    /// Persist the current location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(self.history.current()).map_err(SessionError::from)?;
        self.storage.set(LOCATION_KEY, &json)?;
        Ok(())
    }
}

/// Navigate to an in-app path and show what is there.
///
/// Protected routes without an identity go to the login form instead.
///
/// # Errors
///
/// Returns an error if the path matches no route or loading the page fails.
pub async fn open(ctx: &mut AppContext, nav: &mut Navigator, path: &str) -> Result<()> {
    let location = Location::parse(path);
    let route = Route::parse(location.path());

    if let Access::RedirectToLogin { redirect } = guard(&location, ctx.store().user_info()) {
        return Err(AppError::AuthRequired { redirect });
    }

    match &route {
        Route::Home => catalog::show_listing(ctx, nav, location).await,
        Route::Product(id) => catalog::product(ctx, nav, id.as_str()).await,
        Route::Cart => cart::show(ctx, nav),
        Route::Login | Route::Register => {
            if let Some(target) = ctx.auth().redirect_if_signed_in(&location) {
                output::notice(&format!("Already signed in; continuing at {target}"));
                nav.go(target);
            } else {
                let command = if route == Route::Login { "login" } else { "register" };
                output::notice(&format!("Sign in with `shop {command}`"));
                nav.go(location);
            }
            Ok(())
        }
        Route::Shipping | Route::Payment | Route::PlaceOrder => {
            output::notice(&format!(
                "Checkout step {route} continues on the store website"
            ));
            nav.go(location);
            Ok(())
        }
        Route::Order(id) => account::order(ctx, nav, id.as_str()).await,
        Route::Profile => account::profile(ctx, nav).await,
        Route::MyOrders => account::orders(ctx, nav, None).await,
        Route::NotFound(path) => Err(AppError::NotFound(format!("page {path}"))),
    }
}

pub(crate) fn product_id(raw: &str) -> ProductId {
    ProductId::new(raw.trim())
}

pub(crate) fn order_id(raw: &str) -> OrderId {
    OrderId::new(raw.trim())
}

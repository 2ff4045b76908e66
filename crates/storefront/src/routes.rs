//! Route table and the signed-in gate for protected routes.
//!
//! # Route Structure
//!
//! ```text
//! /                - Product list (?keyword=&page=)
//! /product/:id     - Product detail and reviews
//! /cart            - Cart
//! /login           - Login form (?redirect=)
//! /register        - Registration form (?redirect=)
//!
//! # Requires a signed-in identity
//! /shipping        - Shipping address
//! /payment         - Payment method
//! /placeorder      - Order review
//! /order/:id       - Order detail
//! /profile         - Profile form and recent orders
//! /myorders        - Order history
//! ```

use core::fmt;
use std::borrow::Cow;

use shopfront_core::{Identity, OrderId, ProductId};

use crate::listing::Location;

/// Query parameter carrying the path to return to after signing in.
pub const REDIRECT_PARAM: &str = "redirect";

/// Path of the login form.
pub const LOGIN_PATH: &str = "/login";

/// A known in-app route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Product(ProductId),
    Cart,
    Login,
    Register,
    Shipping,
    Payment,
    PlaceOrder,
    Order(OrderId),
    Profile,
    MyOrders,
    /// Anything else; holds the original path.
    NotFound(String),
}

impl Route {
    /// Match a path (query string ignored) against the route table.
    ///
    /// Id segments are percent-decoded.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] | [""] => Self::Home,
            ["product", id] if !id.is_empty() => Self::Product(ProductId::new(decode(id))),
            ["cart"] => Self::Cart,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["shipping"] => Self::Shipping,
            ["payment"] => Self::Payment,
            ["placeorder"] => Self::PlaceOrder,
            ["order", id] if !id.is_empty() => Self::Order(OrderId::new(decode(id))),
            ["profile"] => Self::Profile,
            ["myorders"] => Self::MyOrders,
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Whether the route is only reachable with a signed-in identity.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Shipping
                | Self::Payment
                | Self::PlaceOrder
                | Self::Order(_)
                | Self::Profile
                | Self::MyOrders
        )
    }

    /// Canonical path of the route, with ids percent-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Product(id) => format!("/product/{}", urlencoding::encode(id.as_str())),
            Self::Cart => "/cart".to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::Register => "/register".to_string(),
            Self::Shipping => "/shipping".to_string(),
            Self::Payment => "/payment".to_string(),
            Self::PlaceOrder => "/placeorder".to_string(),
            Self::Order(id) => format!("/order/{}", urlencoding::encode(id.as_str())),
            Self::Profile => "/profile".to_string(),
            Self::MyOrders => "/myorders".to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), Cow::into_owned)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Result of gating a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Send the user to the login form, then back to `redirect`'s return path.
    RedirectToLogin { redirect: Location },
}

/// Gate the route at `location` on the presence of a signed-in identity.
///
/// The return path is the full href, query string included.
#[must_use]
pub fn guard(location: &Location, user: Option<&Identity>) -> Access {
    let route = Route::parse(location.path());
    if route.requires_auth() && user.is_none() {
        tracing::debug!(route = %route, "Protected route without identity");
        return Access::RedirectToLogin {
            redirect: login_location(&location.href()),
        };
    }
    Access::Allow
}

/// `/login?redirect=<return_path>`.
#[must_use]
pub fn login_location(return_path: &str) -> Location {
    let mut location = Location::parse(LOGIN_PATH);
    location.set_param(REDIRECT_PARAM, Some(return_path));
    location
}

/// Where a login or registration form goes once an identity exists.
///
/// Reads the `redirect` parameter of the form's own location; a missing or
/// blank value means `/`. The target is always treated as an in-app path.
#[must_use]
pub fn redirect_target(location: &Location) -> Location {
    location
        .param(REDIRECT_PARAM)
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map_or_else(Location::root, |target| {
            Location::parse(&format!("/{}", target.trim_start_matches('/')))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::UserId;

    fn identity() -> Identity {
        serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "name": "Ada",
            "email": "ada@example.com"
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/?keyword=x"), Route::Home);
        assert_eq!(Route::parse("/product/p1"), Route::Product(ProductId::new("p1")));
        assert_eq!(Route::parse("/order/o9/"), Route::Order(OrderId::new("o9")));
        assert_eq!(Route::parse("/myorders"), Route::MyOrders);
        assert_eq!(
            Route::parse("/product/"),
            Route::NotFound("/product/".to_string())
        );
        assert_eq!(
            Route::parse("/admin"),
            Route::NotFound("/admin".to_string())
        );
    }

    #[test]
    fn test_guard_redirects_with_return_path() {
        let access = guard(&Location::parse("/shipping"), None);
        let Access::RedirectToLogin { redirect } = access else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.href(), "/login?redirect=%2Fshipping");
        assert_eq!(redirect_target(&redirect).href(), "/shipping");
    }

    #[test]
    fn test_guard_allows_signed_in_and_public() {
        let user = identity();
        assert_eq!(user.id, UserId::new("u1"));
        assert_eq!(guard(&Location::parse("/profile"), Some(&user)), Access::Allow);
        assert_eq!(guard(&Location::parse("/cart"), None), Access::Allow);
        assert_eq!(guard(&Location::parse("/product/p"), None), Access::Allow);
    }

    #[test]
    fn test_guard_keeps_query_in_return_path() {
        let Access::RedirectToLogin { redirect } = guard(&Location::parse("/order/o1?x=1"), None)
        else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.param(REDIRECT_PARAM), Some("/order/o1?x=1"));
        assert_eq!(redirect_target(&redirect).href(), "/order/o1?x=1");
    }

    #[test]
    fn test_ids_with_separators_round_trip() {
        for id in ["a?b", "c#d", "e/f g"] {
            let route = Route::Product(ProductId::new(id));
            let location = Location::parse(&route.path());
            assert_eq!(Route::parse(location.path()), route);

            let route = Route::Order(OrderId::new(id));
            let location = Location::parse(&route.path());
            assert_eq!(Route::parse(location.path()), route);
        }
        assert_eq!(
            Route::Product(ProductId::new("a?b")).path(),
            "/product/a%3Fb"
        );
    }

    #[test]
    fn test_redirect_target_defaults_to_root() {
        assert_eq!(redirect_target(&Location::parse("/login")).href(), "/");
        assert_eq!(redirect_target(&Location::parse("/login?redirect=")).href(), "/");
        assert_eq!(
            redirect_target(&Location::parse("/login?redirect=shipping")).href(),
            "/shipping"
        );
        assert_eq!(
            redirect_target(&Location::parse("/login?redirect=//evil.example")).href(),
            "/evil.example"
        );
    }
}

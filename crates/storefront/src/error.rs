//! Unified error handling with Sentry integration.
//!
//! Every service returns `Result<T, AppError>`. Validation and cart errors
//! are handled where they occur without touching state; remote failures
//! carry the server's message; an unauthenticated call to a protected
//! operation carries the login location to send the user to.

use thiserror::Error;

use shopfront_core::{CartError, Identity};

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::listing::{Location, PageError};
use crate::services::ValidationError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// A form field failed local validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A cart quantity request was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The remote API failed or refused the request.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A state transition could not be persisted.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Local storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A page outside the known range was requested.
    #[error("Pagination error: {0}")]
    Page(#[from] PageError),

    /// The operation needs a signed-in identity.
    #[error("Sign in required (login at {redirect})")]
    AuthRequired {
        /// Login location carrying the return path.
        redirect: Location,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message suitable for showing the user.
    ///
    /// Internal details of persistence and configuration failures are hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Cart(CartError::OutOfStock { .. }) => "Sorry. Product is out of stock".to_string(),
            Self::Cart(e) => e.to_string(),
            Self::Api(e) => e.message(),
            Self::Session(_) | Self::Storage(_) => "Could not save your session".to_string(),
            Self::Config(e) => e.to_string(),
            Self::Page(e) => e.to_string(),
            Self::AuthRequired { .. } => "Please sign in to continue".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
        }
    }

    /// Report failures worth investigating to Sentry and the log.
    ///
    /// User mistakes (validation, stock, sign-in) are not reported.
    pub fn report(&self) {
        let internal = match self {
            Self::Session(_) | Self::Storage(_) => true,
            Self::Api(e) => matches!(
                e,
                ApiError::Parse(_) | ApiError::Status { status: 500.., .. }
            ),
            _ => false,
        };
        if internal {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a signed-in identity.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(identity: &Identity) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity.id.to_string()),
            email: Some(identity.email.clone()),
            username: Some(identity.name.clone()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

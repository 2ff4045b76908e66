//! Authentication service.
//!
//! Validates login, registration and profile forms locally, exchanges them
//! with the API for an [`Identity`] and records that identity in the session.

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::Identity;
use tracing::info;

use crate::api::ApiClient;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::listing::Location;
use crate::routes::{Route, redirect_target};
use crate::session::{Action, Store};

use super::{require_identity, validation};

/// Profile form submission.
#[derive(Debug, Default)]
pub struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    /// New password; `None` or empty keeps the current one.
    pub password: Option<&'a SecretString>,
    pub confirm_password: Option<&'a SecretString>,
}

/// Authentication service.
///
/// Handles login, registration, profile updates and logout.
pub struct AuthService<'a> {
    api: &'a ApiClient,
    store: &'a mut Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    pub fn new(api: &'a ApiClient, store: &'a mut Store) -> Self {
        Self { api, store }
    }

    /// Where a login or register form at `form` should go right away.
    ///
    /// `Some` when an identity is already present: the form is skipped and
    /// the user continues to the form's `redirect` target.
    #[must_use]
    pub fn redirect_if_signed_in(&self, form: &Location) -> Option<Location> {
        self.store.user_info().map(|_| redirect_target(form))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a malformed email or empty
    /// password, and `AppError::Api` if the API rejects the credentials.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<Identity> {
        let email = validation::email(email)?;
        validation::password(password)?;

        let identity = self.api.login(email.as_str(), password).await?;
        self.sign_in(identity, "Logged in")
    }

    /// Register a new account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name, malformed email, or
    /// mismatched passwords, and `AppError::Api` if the API refuses.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<Identity> {
        let name = validation::required("Name", name)?;
        let email = validation::email(email)?;
        validation::password(password)?;
        validation::passwords_match(password, confirm_password)?;

        let identity = self.api.register(name, email.as_str(), password).await?;
        self.sign_in(identity, "Registered")
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthRequired` without an identity,
    /// `AppError::Validation` for bad input, and `AppError::Api` if the API
    /// refuses.
    pub async fn update_profile(&mut self, update: ProfileUpdate<'_>) -> Result<Identity> {
        let current = require_identity(self.store, &Route::Profile)?.clone();

        let name = validation::required("Name", update.name)?;
        let email = validation::email(update.email)?;
        let password = update
            .password
            .filter(|p| !p.expose_secret().is_empty());
        if let Some(password) = password {
            let empty = SecretString::from(String::new());
            validation::passwords_match(password, update.confirm_password.unwrap_or(&empty))?;
        }

        let mut identity = self
            .api
            .update_profile(name, email.as_str(), password, Some(&current))
            .await?;
        if identity.token.is_none() {
            identity.token.clone_from(&current.token);
        }
        self.sign_in(identity, "Updated profile")
    }

    /// Sign out and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the cleared session could not be
    /// persisted; the in-memory session is cleared regardless.
    pub fn logout(&mut self) -> Result<()> {
        let was_signed_in = self.store.user_info().is_some();
        clear_sentry_user();
        self.store.dispatch(Action::UserLogout)?;

        if was_signed_in {
            add_breadcrumb("auth", "Logged out", None);
            info!("User logged out");
        }
        Ok(())
    }

    fn sign_in(&mut self, identity: Identity, event: &str) -> Result<Identity> {
        set_sentry_user(&identity);
        add_breadcrumb("auth", event, Some(&[("user_id", identity.id.as_str())]));
        info!(user_id = %identity.id, "{event}");

        self.store.dispatch(Action::UserLogin(identity.clone()))?;
        Ok(identity)
    }
}

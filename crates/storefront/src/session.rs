//! Persisted session store: the single source of truth for identity and cart.
//!
//! State changes only through [`Store::dispatch`] with an [`Action`]. Every
//! action that touches the cart or the identity writes that slice to local
//! storage before `dispatch` returns, so a restart always rehydrates the last
//! in-memory state.

use serde::de::DeserializeOwned;
use shopfront_core::{CartLine, CartState, Identity, ProductId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Storage keys owned by the session store.
pub mod keys {
    /// Serialized [`Identity`](shopfront_core::Identity) of the signed-in user.
    pub const USER_INFO: &str = "userInfo";

    /// Serialized cart lines.
    pub const CART_ITEMS: &str = "cartItems";
}

/// Errors from persisting a state transition.
///
/// The in-memory transition has already been applied when these are returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to persist session state: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to serialize session state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything the session store mutates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user_info: Option<Identity>,
    pub cart: CartState,
}

/// The complete set of session mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert the line, or replace the line for the same product in place.
    ///
    /// The caller has already merged quantities and checked stock.
    CartAddItem(CartLine),
    /// Remove the line for this product, if any.
    CartRemoveItem(ProductId),
    /// Remove every cart line.
    CartClearItems,
    /// Replace the identity wholesale.
    UserLogin(Identity),
    /// Clear the identity and the cart.
    UserLogout,
}

impl Action {
    /// Short name for logs and breadcrumbs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CartAddItem(_) => "CART_ADD_ITEM",
            Self::CartRemoveItem(_) => "CART_REMOVE_ITEM",
            Self::CartClearItems => "CART_CLEAR_ITEMS",
            Self::UserLogin(_) => "USER_LOGIN",
            Self::UserLogout => "USER_LOGOUT",
        }
    }
}

/// Which slices of [`SessionState`] an action touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touched {
    pub cart: bool,
    pub user_info: bool,
}

/// Apply `action` to `state`.
///
/// No I/O happens here; the returned [`Touched`] tells the caller which
/// slices must be persisted.
pub fn reduce(state: &mut SessionState, action: Action) -> Touched {
    match action {
        Action::CartAddItem(line) => {
            state.cart.upsert(line);
            Touched {
                cart: true,
                user_info: false,
            }
        }
        Action::CartRemoveItem(product) => {
            state.cart.remove(&product);
            Touched {
                cart: true,
                user_info: false,
            }
        }
        Action::CartClearItems => {
            state.cart.clear();
            Touched {
                cart: true,
                user_info: false,
            }
        }
        Action::UserLogin(identity) => {
            state.user_info = Some(identity);
            Touched {
                cart: false,
                user_info: true,
            }
        }
        Action::UserLogout => {
            state.user_info = None;
            state.cart.clear();
            Touched {
                cart: true,
                user_info: true,
            }
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Session store bound to its persistent storage.
pub struct Store {
    state: SessionState,
    storage: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Build the store from whatever `storage` holds.
    ///
    /// Missing, unreadable, or malformed entries fall back to an empty cart
    /// and no identity; they are logged, never fatal.
    pub fn hydrate(storage: Box<dyn KeyValueStore>) -> Self {
        let user_info = read_key::<Identity>(storage.as_ref(), keys::USER_INFO);
        let cart = read_key::<Vec<CartLine>>(storage.as_ref(), keys::CART_ITEMS)
            .map(sanitize_lines)
            .unwrap_or_default();

        debug!(
            signed_in = user_info.is_some(),
            cart_lines = cart.cart_items.len(),
            "Session hydrated"
        );

        Self {
            state: SessionState { user_info, cart },
            storage,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.state.cart
    }

    /// Signed-in identity, if any.
    #[must_use]
    pub const fn user_info(&self) -> Option<&Identity> {
        self.state.user_info.as_ref()
    }

    /// Apply `action` and synchronously persist every slice it touched.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails. The in-memory state keeps the
    /// transition either way.
    pub fn dispatch(&mut self, action: Action) -> Result<(), SessionError> {
        let name = action.name();
        let touched = reduce(&mut self.state, action);
        debug!(action = name, ?touched, "Session action applied");

        let result = self.persist(touched);
        if let Err(e) = &result {
            warn!(action = name, error = %e, "Failed to persist session state");
        }
        result
    }

    fn persist(&mut self, touched: Touched) -> Result<(), SessionError> {
        if touched.cart {
            let json = serde_json::to_string(&self.state.cart.cart_items)?;
            self.storage.set(keys::CART_ITEMS, &json)?;
        }
        if touched.user_info {
            match &self.state.user_info {
                Some(identity) => {
                    let json = serde_json::to_string(identity)?;
                    self.storage.set(keys::USER_INFO, &json)?;
                }
                None => self.storage.remove(keys::USER_INFO)?,
            }
        }
        Ok(())
    }
}

/// Read and decode one key, treating any failure as "absent".
fn read_key<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted session state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Ignoring malformed persisted session state");
            None
        }
    }
}

/// Re-establish cart invariants on lines read back from storage.
///
/// Drops duplicate products and lines that can no longer be ordered, and
/// clamps quantities into `[1, count_in_stock]`.
fn sanitize_lines(lines: Vec<CartLine>) -> CartState {
    let lines = lines
        .into_iter()
        .filter(|line| line.count_in_stock > 0 && line.qty > 0)
        .map(|mut line| {
            line.qty = line.qty.min(line.count_in_stock);
            line
        })
        .collect();
    CartState::from_lines(lines)
}

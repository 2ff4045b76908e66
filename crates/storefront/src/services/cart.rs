//! Cart operations with stock validation.
//!
//! The session reducer trusts whatever line it is given; every stock and
//! quantity check happens here, before dispatch, so a refused request never
//! mutates the cart.

use shopfront_core::{CartError, CartLine, Product, ProductId};
use tracing::info;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::listing::Location;
use crate::routes::login_location;
use crate::session::{Action, Store};

/// Where checkout continues after the cart.
pub const CHECKOUT_PATH: &str = "/shipping";

/// Cart mutations for the current session.
pub struct CartService<'a> {
    store: &'a mut Store,
}

impl<'a> CartService<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Add `qty` units of `product`, merging with any existing line.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cart`] if the product is out of stock or the
    /// merged quantity would exceed stock; the cart is unchanged. Returns
    /// [`AppError::Session`] if the new cart could not be persisted.
    pub fn add(&mut self, product: &Product, qty: u32) -> Result<CartLine> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock {
                requested: qty,
                available: 0,
            }
            .into());
        }

        let merged = self.store.cart().merged_quantity(&product.id, qty);
        let line = CartLine::from_product(product, merged)?;
        self.store.dispatch(Action::CartAddItem(line.clone()))?;

        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.as_str()), ("qty", &merged.to_string())]),
        );
        info!(product_id = %product.id, qty = merged, "Added to cart");
        Ok(line)
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the product is not in the cart, and
    /// [`AppError::Cart`] if `qty` is zero or exceeds the line's stock.
    pub fn update_quantity(&mut self, product: &ProductId, qty: u32) -> Result<CartLine> {
        let line = self
            .store
            .cart()
            .find(product)
            .ok_or_else(|| AppError::NotFound(format!("cart item {product}")))?
            .with_qty(qty)?;
        self.store.dispatch(Action::CartAddItem(line.clone()))?;

        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[("product_id", product.as_str()), ("qty", &qty.to_string())]),
        );
        Ok(line)
    }

    /// Remove the line for `product`. Returns whether a line was present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the new cart could not be persisted.
    pub fn remove(&mut self, product: &ProductId) -> Result<bool> {
        let present = self.store.cart().find(product).is_some();
        self.store
            .dispatch(Action::CartRemoveItem(product.clone()))?;

        if present {
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", product.as_str())]),
            );
        }
        Ok(present)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the empty cart could not be persisted.
    pub fn clear(&mut self) -> Result<()> {
        self.store.dispatch(Action::CartClearItems)?;
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(())
    }
}

/// Location the checkout button leads to.
///
/// Always goes through the login form, which forwards signed-in users to
/// shipping straight away.
#[must_use]
pub fn checkout_location() -> Location {
    login_location(CHECKOUT_PATH)
}

//! Cart lines and cart arithmetic.
//!
//! The cart is a client-side snapshot: each line copies the product fields
//! needed to render it (name, image, price, stock) at the time it was added.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Quantity requests the cart refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantities start at 1; removing a line is a separate operation.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The requested quantity exceeds the stock snapshot.
    #[error("Sorry. Product is out of stock (requested {requested}, available {available})")]
    OutOfStock {
        /// Quantity that was asked for.
        requested: u32,
        /// Units in stock.
        available: u32,
    },
}

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub product: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    pub count_in_stock: u32,
    pub qty: u32,
}

impl CartLine {
    /// Snapshot `product` into a line with quantity `qty`.
    ///
    /// # Errors
    ///
    /// Returns an error if `qty` is zero or exceeds the product's stock.
    pub fn from_product(product: &Product, qty: u32) -> Result<Self, CartError> {
        Ok(Self {
            product: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            count_in_stock: product.count_in_stock,
            qty: check_quantity(qty, product.count_in_stock)?,
        })
    }

    /// Copy of this line with a different quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `qty` is zero or exceeds the line's stock snapshot.
    pub fn with_qty(&self, qty: u32) -> Result<Self, CartError> {
        Ok(Self {
            qty: check_quantity(qty, self.count_in_stock)?,
            ..self.clone()
        })
    }

    /// `price * qty`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Validate `qty` against a stock count.
///
/// # Errors
///
/// Returns [`CartError::ZeroQuantity`] for zero and [`CartError::OutOfStock`]
/// when `qty > count_in_stock`.
pub const fn check_quantity(qty: u32, count_in_stock: u32) -> Result<u32, CartError> {
    if qty == 0 {
        return Err(CartError::ZeroQuantity);
    }
    if qty > count_in_stock {
        return Err(CartError::OutOfStock {
            requested: qty,
            available: count_in_stock,
        });
    }
    Ok(qty)
}

/// Ordered cart contents. At most one line per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub cart_items: Vec<CartLine>,
}

impl CartState {
    /// Build a cart from persisted lines, keeping the first line per product.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::default();
        for line in lines {
            if cart.find(&line.product).is_none() {
                cart.cart_items.push(line);
            }
        }
        cart
    }

    /// The line for `product`, if present.
    #[must_use]
    pub fn find(&self, product: &ProductId) -> Option<&CartLine> {
        self.cart_items.iter().find(|line| &line.product == product)
    }

    /// Replace the line with the same product in place, or append it.
    pub fn upsert(&mut self, line: CartLine) {
        match self
            .cart_items
            .iter_mut()
            .find(|existing| existing.product == line.product)
        {
            Some(existing) => *existing = line,
            None => self.cart_items.push(line),
        }
    }

    /// Remove the line for `product`. Returns whether a line was removed.
    pub fn remove(&mut self, product: &ProductId) -> bool {
        let before = self.cart_items.len();
        self.cart_items.retain(|line| &line.product != product);
        self.cart_items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.cart_items.clear();
    }

    /// Quantity to dispatch when adding `qty` more units of `product`.
    ///
    /// Sums with the existing line quantity, saturating rather than wrapping.
    #[must_use]
    pub fn merged_quantity(&self, product: &ProductId, qty: u32) -> u32 {
        self.find(product)
            .map_or(qty, |line| line.qty.saturating_add(qty))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart_items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.qty))
    }

    /// Sum of `price * qty` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart_items.iter().map(CartLine::line_total).sum()
    }
}

//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod product;

pub use cart::{CartError, CartLine, CartState, check_quantity};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use order::{Order, OrderItem, ShippingAddress};
pub use price::Price;
pub use product::{MAX_RATING, Product, ProductPage, Review};

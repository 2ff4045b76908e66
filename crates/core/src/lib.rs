//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `storefront` - Client library: session store, API client, list view
//! - `cli` - Command-line storefront built on the client library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails, identities, catalog and cart types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

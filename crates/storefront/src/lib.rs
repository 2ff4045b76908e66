//! Shopfront storefront client library.
//!
//! Everything a storefront front end needs short of rendering: the persisted
//! cart and session store, the REST API client, the URL-synchronized product
//! list, the route guard, and the services that validate input before
//! talking to the API.
//!
//! # Architecture
//!
//! - [`session::Store`] is the single source of truth for identity and cart;
//!   it changes only through [`session::Action`] and persists every change
//! - [`api::ApiClient`] owns every remote call; products, orders, reviews
//!   and accounts live on the server
//! - [`listing::ListView`] takes its page and keyword from the URL and
//!   ignores responses to superseded requests
//! - [`state::AppContext`] is built once and hands out services

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

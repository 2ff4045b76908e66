//! Catalog projections: products, reviews and product list pages.
//!
//! These are read-only views of documents owned by the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReviewId, UserId};
use super::price::Price;

/// Highest star rating a review can give.
pub const MAX_RATING: u8 = 5;

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub count_in_stock: u32,
    /// Average rating, 0.0 to 5.0.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
    /// Only populated by the single-product endpoint.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }

    /// Average rating rendered as five filled or empty stars.
    #[must_use]
    pub fn stars(&self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = self.rating.clamp(0.0, f64::from(MAX_RATING)).floor() as u8;
        star_string(filled)
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Review rating rendered as five filled or empty stars.
    #[must_use]
    pub fn stars(&self) -> String {
        star_string(self.rating.min(MAX_RATING))
    }

    /// Creation date as `YYYY-MM-DD`, or an empty string when unknown.
    #[must_use]
    pub fn date(&self) -> String {
        self.created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

fn star_string(filled: u8) -> String {
    let filled = usize::from(filled.min(MAX_RATING));
    let mut out = "★".repeat(filled);
    out.push_str(&"☆".repeat(usize::from(MAX_RATING) - filled));
    out
}

/// One page of a (possibly filtered) product listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Page number the server actually served (1-based).
    pub page: u32,
    /// Page count as reported by the server, if it reported one.
    pub pages: Option<u32>,
    /// Total number of matching products across all pages.
    pub total: u64,
}

impl ProductPage {
    /// Number of pages for `limit` products per page.
    ///
    /// Prefers the server's own page count and falls back to
    /// `ceil(total / limit)`. Never less than 1, so an empty result still
    /// has a valid first page.
    #[must_use]
    pub fn total_pages(&self, limit: u32) -> u32 {
        if let Some(pages) = self.pages.filter(|p| *p > 0) {
            return pages;
        }
        let limit = u64::from(limit.max(1));
        u32::try_from(self.total.div_ceil(limit))
            .unwrap_or(u32::MAX)
            .max(1)
    }
}

//! Cache for product detail responses.

use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{Product, ProductId};

const MAX_ENTRIES: u64 = 1000;
const TTL: Duration = Duration::from_secs(300);

/// Product details keyed by product id (5 minute TTL).
pub type ProductCache = Cache<ProductId, Product>;

pub fn product_cache() -> ProductCache {
    Cache::builder()
        .max_capacity(MAX_ENTRIES)
        .time_to_live(TTL)
        .build()
}

//! Order history projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use super::price::Price;

/// An order placed by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub items_price: Price,
    #[serde(default)]
    pub tax_price: Price,
    #[serde(default)]
    pub shipping_price: Price,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    pub product: ProductId,
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// The `n` most recent orders, newest first.
///
/// Orders without a creation date sort after every dated order.
#[must_use]
pub fn most_recent(mut orders: Vec<Order>, n: usize) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders.truncate(n);
    orders
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: &str, created_at: Option<&str>) -> Order {
        let mut json = serde_json::json!({ "_id": id });
        if let Some(at) = created_at {
            json["createdAt"] = serde_json::Value::from(at);
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_most_recent_newest_first() {
        let orders = vec![
            order("a", Some("2024-01-01T00:00:00Z")),
            order("b", None),
            order("c", Some("2024-03-01T00:00:00Z")),
            order("d", Some("2024-02-01T00:00:00Z")),
        ];
        let recent = most_recent(orders, 3);
        let ids: Vec<&str> = recent.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["c", "d", "a"]);
    }

    #[test]
    fn test_order_defaults() {
        let order = order("x", None);
        assert!(order.order_items.is_empty());
        assert_eq!(order.total_price, Price::ZERO);
        assert!(!order.is_paid);
    }
}

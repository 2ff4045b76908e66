//! Terminal rendering of storefront pages.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use shopfront_core::{CartLine, CartState, Identity, Order, Product};
use shopfront_storefront::error::AppError;
use shopfront_storefront::listing::{ListView, Phase};
use shopfront_storefront::routes::redirect_target;

pub fn notice(message: &str) {
    println!("{message}");
}

/// Print an error the way the page would show it.
pub fn error(err: &AppError) {
    eprintln!("error: {}", err.user_message());
    if let AppError::AuthRequired { redirect } = err {
        eprintln!(
            "Sign in with `shop login`, then continue at {}",
            redirect_target(redirect)
        );
    }
}

pub fn listing(view: &ListView) {
    if view.phase() == Phase::Failed {
        eprintln!("error: {}", view.error().unwrap_or("Could not load products"));
        return;
    }

    println!("{}", view.heading());
    for product in view.products() {
        let stock = if product.in_stock() {
            String::new()
        } else {
            " (out of stock)".to_string()
        };
        println!(
            "  {:<26} {:<40} {:>10}  {} ({}){stock}",
            product.id,
            product.name,
            product.price.to_string(),
            product.stars(),
            product.num_reviews
        );
    }
    if view.total_pages() > 1 {
        println!(
            "Page {} of {} ({} products)",
            view.current_page(),
            view.total_pages(),
            view.total_count()
        );
    }
}

pub fn product(product: &Product, in_cart: Option<&CartLine>) {
    println!("{} ({})", product.name, product.id);
    if !product.brand.is_empty() || !product.category.is_empty() {
        println!("{} / {}", product.brand, product.category);
    }
    println!("{}  {} ({} reviews)", product.price, product.stars(), product.num_reviews);
    if product.in_stock() {
        println!("In stock: {}", product.count_in_stock);
    } else {
        println!("Out of stock");
    }
    if let Some(line) = in_cart {
        println!("In your cart: {}", line.qty);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }

    println!();
    if product.reviews.is_empty() {
        println!("No reviews yet.");
    }
    for review in &product.reviews {
        println!("{} {}  {}", review.stars(), review.name, review.date());
        println!("  {}", review.comment);
    }
}

pub fn cart(cart: &CartState) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in &cart.cart_items {
        println!(
            "  {:<26} {:<40} {:>3} x {:>10} = {:>10}",
            line.product,
            line.name,
            line.qty,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    println!("Subtotal ({} items): {}", cart.item_count(), cart.subtotal());
}

pub fn profile(identity: &Identity, recent: &[Order]) {
    println!("{} <{}>", identity.name, identity.email);
    println!("Member since: {}", identity.member_since());
    if !recent.is_empty() {
        println!();
        println!("Recent orders:");
        orders(recent);
    }
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        let date = order
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "  {:<26} {:<10} {:>10}  {}  {}",
            order.id,
            date,
            order.total_price.to_string(),
            if order.is_paid { "paid" } else { "unpaid" },
            if order.is_delivered {
                "delivered"
            } else {
                "not delivered"
            }
        );
    }
}

pub fn order(order: &Order) {
    println!("Order {}", order.id);
    if let Some(address) = &order.shipping_address {
        println!(
            "Ship to: {}, {} {}, {}",
            address.address, address.city, address.postal_code, address.country
        );
    }
    if !order.payment_method.is_empty() {
        println!("Payment: {}", order.payment_method);
    }
    match order.paid_at {
        Some(at) => println!("Paid on {}", at.format("%Y-%m-%d")),
        None if order.is_paid => println!("Paid"),
        None => println!("Not paid"),
    }
    match order.delivered_at {
        Some(at) => println!("Delivered on {}", at.format("%Y-%m-%d")),
        None if order.is_delivered => println!("Delivered"),
        None => println!("Not delivered"),
    }

    println!();
    for item in &order.order_items {
        println!(
            "  {:<40} {:>3} x {:>10} = {:>10}",
            item.name,
            item.qty,
            item.price.to_string(),
            item.price.times(item.qty).to_string()
        );
    }
    println!("Items:    {:>10}", order.items_price.to_string());
    println!("Shipping: {:>10}", order.shipping_price.to_string());
    println!("Tax:      {:>10}", order.tax_price.to_string());
    println!("Total:    {:>10}", order.total_price.to_string());
}

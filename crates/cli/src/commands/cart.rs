//! Cart commands.

use shopfront_storefront::error::Result;
use shopfront_storefront::listing::Location;
use shopfront_storefront::routes::Route;
use shopfront_storefront::services::checkout_location;
use shopfront_storefront::state::AppContext;

use super::{Navigator, product_id};
use crate::output;

pub fn show(ctx: &AppContext, nav: &mut Navigator) -> Result<()> {
    nav.go(Location::parse(&Route::Cart.path()));
    output::cart(ctx.store().cart());
    Ok(())
}

/// Fetch the product for a fresh stock count, then add it.
pub async fn add(ctx: &mut AppContext, id: &str, qty: u32) -> Result<()> {
    let product = ctx.catalog().product(&product_id(id)).await?;
    let line = ctx.cart().add(&product, qty)?;

    output::notice(&format!("{} in cart: {}", line.name, line.qty));
    output::cart(ctx.store().cart());
    Ok(())
}

pub fn set(ctx: &mut AppContext, id: &str, qty: u32) -> Result<()> {
    ctx.cart().update_quantity(&product_id(id), qty)?;
    output::cart(ctx.store().cart());
    Ok(())
}

pub fn remove(ctx: &mut AppContext, id: &str) -> Result<()> {
    if !ctx.cart().remove(&product_id(id))? {
        output::notice("That product is not in your cart");
    }
    output::cart(ctx.store().cart());
    Ok(())
}

pub fn clear(ctx: &mut AppContext) -> Result<()> {
    ctx.cart().clear()?;
    output::cart(ctx.store().cart());
    Ok(())
}

/// Proceed to checkout through the login form.
pub fn checkout(ctx: &mut AppContext, nav: &mut Navigator) -> Result<()> {
    if ctx.store().cart().is_empty() {
        output::notice("Your cart is empty");
        return Ok(());
    }

    let login = checkout_location();
    match ctx.auth().redirect_if_signed_in(&login) {
        Some(target) => {
            output::notice(&format!("Continue checkout at {target}"));
            nav.go(target);
        }
        None => {
            output::notice("Sign in with `shop login` to check out");
            nav.go(login);
        }
    }
    Ok(())
}

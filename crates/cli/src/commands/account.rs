//! Login, registration, profile and order history.

use secrecy::SecretString;
use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::listing::Location;
use shopfront_storefront::routes::{LOGIN_PATH, Route, login_location, redirect_target};
use shopfront_storefront::services::{PROFILE_RECENT_ORDERS, ProfileUpdate};
use shopfront_storefront::state::AppContext;

use super::{Navigator, order_id};
use crate::output;

/// The form location in effect: the saved one when it is this form,
/// otherwise a bare `path`.
fn form_location(nav: &Navigator, route: &Route) -> Location {
    let current = nav.current();
    if &Route::parse(current.path()) == route {
        current.clone()
    } else {
        Location::parse(&route.path())
    }
}

/// Continue to the form's redirect target, or report that we already can.
fn skip_if_signed_in(ctx: &mut AppContext, nav: &mut Navigator, form: &Location) -> bool {
    let Some(target) = ctx.auth().redirect_if_signed_in(form) else {
        return false;
    };
    output::notice(&format!("Already signed in; continuing at {target}"));
    nav.go(target);
    true
}

pub async fn login(
    ctx: &mut AppContext,
    nav: &mut Navigator,
    email: &str,
    password: &SecretString,
) -> Result<()> {
    let form = form_location(nav, &Route::Login);
    if skip_if_signed_in(ctx, nav, &form) {
        return Ok(());
    }

    let identity = ctx.auth().login(email, password).await?;
    let target = redirect_target(&form);
    output::notice(&format!("Signed in as {}; continuing at {target}", identity.name));
    nav.go(target);
    Ok(())
}

pub async fn register(
    ctx: &mut AppContext,
    nav: &mut Navigator,
    name: &str,
    email: &str,
    password: &SecretString,
    confirm_password: &SecretString,
) -> Result<()> {
    // A redirect carried by the login form applies to registration too.
    let form = match Route::parse(nav.current().path()) {
        Route::Login | Route::Register => nav.current().clone(),
        _ => Location::parse(&Route::Register.path()),
    };
    if skip_if_signed_in(ctx, nav, &form) {
        return Ok(());
    }

    let identity = ctx
        .auth()
        .register(name, email, password, confirm_password)
        .await?;
    let target = redirect_target(&form);
    output::notice(&format!("Welcome, {}; continuing at {target}", identity.name));
    nav.go(target);
    Ok(())
}

pub fn logout(ctx: &mut AppContext, nav: &mut Navigator) -> Result<()> {
    ctx.auth().logout()?;
    output::notice("Signed out");
    nav.go(Location::parse(LOGIN_PATH));
    Ok(())
}

/// `shop profile show`: identity plus the most recent orders.
pub async fn profile(ctx: &AppContext, nav: &mut Navigator) -> Result<()> {
    let orders = ctx.orders().recent(PROFILE_RECENT_ORDERS).await?;
    let identity = ctx.store().user_info().ok_or_else(|| AppError::AuthRequired {
        redirect: login_location(&Route::Profile.path()),
    })?;

    nav.go(Location::parse(&Route::Profile.path()));
    output::profile(identity, &orders);
    Ok(())
}

/// `shop profile update`; omitted name or email keep their current value.
pub async fn update_profile(
    ctx: &mut AppContext,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&SecretString>,
    confirm_password: Option<&SecretString>,
) -> Result<()> {
    let (current_name, current_email) = ctx
        .store()
        .user_info()
        .map(|identity| (identity.name.clone(), identity.email.clone()))
        .unwrap_or_default();

    let identity = ctx
        .auth()
        .update_profile(ProfileUpdate {
            name: name.unwrap_or(&current_name),
            email: email.unwrap_or(&current_email),
            password,
            confirm_password,
        })
        .await?;
    output::notice("Profile updated");
    output::profile(&identity, &[]);
    Ok(())
}

pub async fn orders(ctx: &AppContext, nav: &mut Navigator, recent: Option<usize>) -> Result<()> {
    let orders = match recent {
        Some(n) => ctx.orders().recent(n).await?,
        None => ctx.orders().my_orders().await?,
    };

    nav.go(Location::parse(&Route::MyOrders.path()));
    output::orders(&orders);
    Ok(())
}

pub async fn order(ctx: &AppContext, nav: &mut Navigator, id: &str) -> Result<()> {
    let id = order_id(id);
    let order = ctx.orders().order(&id).await?;

    nav.go(Location::parse(&Route::Order(id).path()));
    output::order(&order);
    Ok(())
}

//! Product listing, product detail and reviews.

use shopfront_storefront::error::Result;
use shopfront_storefront::listing::{KEYWORD_PARAM, ListView, Location, PAGE_PARAM, Phase};
use shopfront_storefront::routes::Route;
use shopfront_storefront::state::AppContext;

use super::{Navigator, product_id};
use crate::output;

/// `shop products [-k KEYWORD] [-p PAGE]`.
///
/// A keyword alone is a search from page 1. With neither flag the current
/// listing is reloaded.
pub async fn products(
    ctx: &AppContext,
    nav: &mut Navigator,
    keyword: Option<&str>,
    page: Option<u32>,
) -> Result<()> {
    let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

    match (keyword, page) {
        (Some(keyword), None) => {
            let mut view = ctx.list_view();
            if let Some(ticket) = view.submit_search(keyword, nav.history()) {
                let fetched = ListView::fetch(ctx.api(), ticket).await;
                view.complete(fetched);
            }
            output::listing(&view);
            Ok(())
        }
        (None, None) if Route::parse(nav.current().path()) == Route::Home => {
            let current = nav.current().clone();
            show_listing(ctx, nav, current).await
        }
        (keyword, page) => {
            let mut location = Location::root();
            location.set_param(KEYWORD_PARAM, keyword);
            let page = page.filter(|p| *p > 1).map(|p| p.to_string());
            location.set_param(PAGE_PARAM, page.as_deref());
            show_listing(ctx, nav, location).await
        }
    }
}

/// Navigate to a listing location and display it.
pub async fn show_listing(ctx: &AppContext, nav: &mut Navigator, location: Location) -> Result<()> {
    nav.go(location);
    let mut view = ctx.list_view();
    view.load(ctx.api(), nav.current()).await;
    output::listing(&view);
    Ok(())
}

/// `shop next` / `shop prev`: move `delta` pages through the current listing.
///
/// # Errors
///
/// Returns `AppError::Page` when already on the first or last page; the
/// saved location is left as it was.
pub async fn step(ctx: &AppContext, nav: &mut Navigator, delta: i32) -> Result<()> {
    if Route::parse(nav.current().path()) != Route::Home {
        nav.go(Location::root());
    }

    let mut view = ctx.list_view();
    view.load(ctx.api(), nav.current()).await;
    if view.phase() == Phase::Failed {
        output::listing(&view);
        return Ok(());
    }

    let target = view.current_page().saturating_add_signed(delta);
    if let Some(ticket) = view.request_page(target, nav.history())? {
        let fetched = ListView::fetch(ctx.api(), ticket).await;
        view.complete(fetched);
    }
    output::listing(&view);
    Ok(())
}

/// `shop product <id>`.
pub async fn product(ctx: &AppContext, nav: &mut Navigator, id: &str) -> Result<()> {
    let id = product_id(id);
    let product = ctx.catalog().product(&id).await?;

    nav.go(Location::parse(&Route::Product(id.clone()).path()));
    output::product(&product, ctx.store().cart().find(&id));
    Ok(())
}

/// `shop review <id> -r <rating> -c <comment>`.
pub async fn review(
    ctx: &AppContext,
    nav: &mut Navigator,
    id: &str,
    rating: u8,
    comment: &str,
) -> Result<()> {
    let id = product_id(id);
    let product = ctx.reviews().submit(&id, rating, comment).await?;

    output::notice("Review submitted");
    nav.go(Location::parse(&Route::Product(id.clone()).path()));
    output::product(&product, ctx.store().cart().find(&id));
    Ok(())
}

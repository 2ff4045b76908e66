//! Product list view kept consistent with the URL.
//!
//! The URL is the single source of truth: [`ListView::sync`] derives the
//! query from a location and issues a [`FetchTicket`] when it changed.
//! Page changes and searches rewrite the location first and then sync, so a
//! reload or back/forward navigation reproduces the same page.
//!
//! Responses can complete in any order. Each ticket carries the generation
//! it was issued under and [`ListView::complete`] ignores any ticket that is
//! no longer the latest.

use shopfront_core::{Product, ProductPage};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};

use super::location::{History, Location};
use super::query::{KEYWORD_PARAM, QueryState};

/// Lifecycle of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch for the current query is outstanding.
    Loading,
    /// The current query's page is displayed.
    Success,
    /// The current query failed; see [`ListView::error`].
    Failed,
}

/// Page change requests the view refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is out of range (1-{total_pages})")]
    OutOfRange { requested: u32, total_pages: u32 },
    #[error("page count for this search is not known yet")]
    NotLoaded,
}

/// Permission to fetch one query, valid until a newer ticket is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: QueryState,
}

impl FetchTicket {
    /// Query this ticket fetches.
    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }
}

/// A finished fetch, ready to hand to [`ListView::complete`].
#[derive(Debug)]
pub struct FetchResult {
    pub ticket: FetchTicket,
    pub result: Result<ProductPage, ApiError>,
}

/// What [`ListView::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result belonged to the latest request and is now displayed.
    Applied,
    /// A newer request was issued; the result was discarded.
    Stale,
}

/// Paginated, searchable product list.
#[derive(Debug, Clone)]
pub struct ListView {
    limit: u32,
    phase: Phase,
    desired: Option<QueryState>,
    generation: u64,
    products: Vec<Product>,
    current_page: u32,
    total_pages: u32,
    total_count: u64,
    /// Keyword whose page count `total_pages` describes.
    loaded_keyword: Option<String>,
    error: Option<String>,
}

impl ListView {
    /// An idle view requesting `limit` products per page.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            phase: Phase::Idle,
            desired: None,
            generation: 0,
            products: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total_count: 0,
            loaded_keyword: None,
            error: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Query the view currently wants displayed.
    #[must_use]
    pub const fn query(&self) -> Option<&QueryState> {
        self.desired.as_ref()
    }

    /// Align the view with `location`.
    ///
    /// Returns a ticket when the `(keyword, page)` pair differs from the last
    /// one requested, when nothing was requested yet, or when the last
    /// request for it failed. The view is then `Loading` and any older
    /// ticket is stale.
    pub fn sync(&mut self, location: &Location) -> Option<FetchTicket> {
        let query = QueryState::from_location(location, self.limit);
        let settled = matches!(self.phase, Phase::Loading | Phase::Success);
        if settled && self.desired.as_ref() == Some(&query) {
            return None;
        }

        let keyword_changed = self
            .desired
            .as_ref()
            .is_some_and(|previous| previous.keyword != query.keyword);
        if keyword_changed {
            self.error = None;
        }

        self.generation += 1;
        self.phase = Phase::Loading;
        self.desired = Some(query.clone());
        debug!(
            generation = self.generation,
            keyword = %query.keyword,
            page = query.page,
            "List query changed"
        );

        Some(FetchTicket {
            generation: self.generation,
            query,
        })
    }

    /// Apply a finished fetch unless a newer request superseded it.
    ///
    /// A failure clears the product list so items from an older query are
    /// never shown under the new one.
    pub fn complete(&mut self, fetched: FetchResult) -> Outcome {
        let FetchResult { ticket, result } = fetched;
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                page = ticket.query.page,
                "Discarding stale product page"
            );
            return Outcome::Stale;
        }

        match result {
            Ok(page) => {
                self.total_pages = page.total_pages(self.limit);
                self.total_count = page.total;
                self.current_page = page.page.clamp(1, self.total_pages);
                self.products = page.products;
                self.loaded_keyword = Some(ticket.query.keyword);
                self.error = None;
                self.phase = Phase::Success;
                info!(
                    page = self.current_page,
                    total_pages = self.total_pages,
                    total = self.total_count,
                    "Product page loaded"
                );
            }
            Err(e) => {
                self.products.clear();
                self.error = Some(e.message());
                self.phase = Phase::Failed;
                tracing::warn!(error = %e, page = ticket.query.page, "Product page failed");
            }
        }
        Outcome::Applied
    }

    /// Move to page `page` by rewriting the current URL.
    ///
    /// Pages outside `[1, total_pages]` are refused without touching the URL
    /// or issuing a fetch. Asking for the page already in the URL only
    /// refetches it when its last load failed.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotLoaded`] while a new search has not loaded yet,
    /// and [`PageError::OutOfRange`] for a page outside the known range.
    pub fn request_page(
        &mut self,
        page: u32,
        history: &mut History,
    ) -> Result<Option<FetchTicket>, PageError> {
        let desired_keyword = self.desired.as_ref().map(|q| q.keyword.as_str());
        if desired_keyword != self.loaded_keyword.as_deref() {
            return Err(PageError::NotLoaded);
        }
        if page < 1 || page > self.total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages: self.total_pages,
            });
        }

        let current = QueryState::from_location(history.current(), self.limit);
        if current.page == page {
            return Ok(self.sync(history.current()));
        }

        let mut location = history.current().clone();
        current.with_page(page).write_to(&mut location);
        history.push(location);
        Ok(self.sync(history.current()))
    }

    /// Search for `keyword` from the first page.
    ///
    /// Blank input does nothing. Otherwise navigates to `/?keyword=...`.
    /// Resubmitting a search that failed retries it. The previous error is
    /// cleared only when a fetch is issued.
    pub fn submit_search(&mut self, keyword: &str, history: &mut History) -> Option<FetchTicket> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }

        let mut location = Location::root();
        location.set_param(KEYWORD_PARAM, Some(keyword));
        if *history.current() != location {
            history.push(location);
        }
        let ticket = self.sync(history.current())?;
        self.error = None;
        Some(ticket)
    }

    /// Perform the fetch a ticket authorizes.
    pub async fn fetch(api: &ApiClient, ticket: FetchTicket) -> FetchResult {
        let result = api.list_products(&ticket.query.to_request()).await;
        FetchResult { ticket, result }
    }

    /// Sync with `location` and, if that issued a ticket, fetch and apply it.
    pub async fn load(&mut self, api: &ApiClient, location: &Location) -> Option<Outcome> {
        let ticket = self.sync(location)?;
        let fetched = Self::fetch(api, ticket).await;
        Some(self.complete(fetched))
    }

    /// Heading for the list, mirroring what is (or is not) shown.
    #[must_use]
    pub fn heading(&self) -> String {
        let keyword = self.desired.as_ref().map_or("", |q| q.keyword.as_str());
        match (keyword.is_empty(), self.products.is_empty()) {
            (true, false) => "Latest Products".to_string(),
            (true, true) => "No products available at the moment.".to_string(),
            (false, false) => format!("Results for: \"{keyword}\""),
            (false, true) => format!("No products found for \"{keyword}\""),
        }
    }
}

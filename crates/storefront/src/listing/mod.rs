//! Paginated, searchable product list kept in sync with the URL.
//!
//! # Flow
//!
//! ```text
//! URL (keyword, page) --sync--> QueryState --ticket--> fetch --complete--> ListView
//!        ^                                                                    |
//!        +------------------- request_page / submit_search ------------------+
//! ```
//!
//! The view never changes its page directly: it rewrites the URL and the URL
//! drives the fetch, so reloads and back/forward land on the same page.

mod location;
mod query;
mod view;

pub use location::{History, Location};
pub use query::{KEYWORD_PARAM, PAGE_PARAM, QueryState};
pub use view::{FetchResult, FetchTicket, ListView, Outcome, PageError, Phase};

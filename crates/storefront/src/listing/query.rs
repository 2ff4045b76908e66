//! Query state of the product list, mirrored in the URL.

use crate::api::ProductQuery;

use super::location::Location;

/// URL parameter holding the search keyword.
pub const KEYWORD_PARAM: &str = "keyword";

/// URL parameter holding the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// The `(keyword, page)` pair driving the product list, plus the fixed page size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryState {
    pub keyword: String,
    pub page: u32,
    pub limit: u32,
}

impl QueryState {
    /// Derive query state from `location`.
    ///
    /// A missing, non-numeric or zero `page` means page 1. The keyword is
    /// trimmed; a blank keyword means "no filter".
    #[must_use]
    pub fn from_location(location: &Location, limit: u32) -> Self {
        let keyword = location
            .param(KEYWORD_PARAM)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let page = location
            .param(PAGE_PARAM)
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Self {
            keyword,
            page,
            limit: limit.max(1),
        }
    }

    /// Write keyword and page into `location`, omitting defaults.
    pub fn write_to(&self, location: &mut Location) {
        let keyword = (!self.keyword.is_empty()).then_some(self.keyword.as_str());
        location.set_param(KEYWORD_PARAM, keyword);

        let page = (self.page > 1).then(|| self.page.to_string());
        location.set_param(PAGE_PARAM, page.as_deref());
    }

    /// The same query on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Request parameters for the API.
    #[must_use]
    pub fn to_request(&self) -> ProductQuery {
        ProductQuery::new(self.keyword.clone(), self.page, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_location_defaults() {
        let query = QueryState::from_location(&Location::root(), 8);
        assert_eq!(query.keyword, "");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 8);
    }

    #[test]
    fn test_from_location_ignores_bad_pages() {
        for href in ["/?page=0", "/?page=-2", "/?page=two", "/?page="] {
            let query = QueryState::from_location(&Location::parse(href), 8);
            assert_eq!(query.page, 1, "{href}");
        }
    }

    #[test]
    fn test_write_omits_first_page_and_empty_keyword() {
        let mut location = Location::parse("/?keyword=phone&page=3");
        let query = QueryState {
            keyword: String::new(),
            page: 1,
            limit: 8,
        };
        query.write_to(&mut location);
        assert_eq!(location.href(), "/");

        query.with_page(2).write_to(&mut location);
        assert_eq!(location.href(), "/?page=2");
    }

    #[test]
    fn test_round_trip_through_location() {
        let query = QueryState {
            keyword: "usb c".to_string(),
            page: 4,
            limit: 8,
        };
        let mut location = Location::root();
        query.write_to(&mut location);
        assert_eq!(QueryState::from_location(&location, 8), query);
    }
}

//! In-app locations and the navigation history that holds them.
//!
//! A [`Location`] is the path plus query string of an in-app URL such as
//! `/?keyword=phone&page=2`. The list view reads its query state from here
//! and writes page changes back here, never the other way around.

use core::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Path and query parameters of an in-app URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Location {
    path: String,
    params: Vec<(String, String)>,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    /// The home page, `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            params: Vec::new(),
        }
    }

    /// Parse an href. Fragments are dropped and an empty path becomes `/`.
    #[must_use]
    pub fn parse(href: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let (path, query) = href.split_once('?').unwrap_or((href, ""));

        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let params = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self { path, params }
    }

    /// Path component, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of query parameter `key`.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set (or with `None`, remove) query parameter `key`.
    ///
    /// An existing parameter keeps its position; a new one is appended.
    pub fn set_param(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                let mut replaced = false;
                self.params.retain_mut(|(k, v)| {
                    if k != key {
                        return true;
                    }
                    if replaced {
                        return false;
                    }
                    value.clone_into(v);
                    replaced = true;
                    true
                });
                if !replaced {
                    self.params.push((key.to_string(), value.to_string()));
                }
            }
            None => self.params.retain(|(k, _)| k != key),
        }
    }

    /// Path plus encoded query string.
    #[must_use]
    pub fn href(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Self::parse(&href)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.href()
    }
}

// =============================================================================
// History
// =============================================================================

/// Back/forward navigation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    past: Vec<Location>,
    current: Location,
    future: Vec<Location>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Location::root())
    }
}

impl History {
    /// Start a history at `initial`.
    #[must_use]
    pub const fn new(initial: Location) -> Self {
        Self {
            past: Vec::new(),
            current: initial,
            future: Vec::new(),
        }
    }

    /// The location currently shown.
    #[must_use]
    pub const fn current(&self) -> &Location {
        &self.current
    }

    /// Navigate to `location`, discarding any forward entries.
    pub fn push(&mut self, location: Location) {
        let previous = std::mem::replace(&mut self.current, location);
        self.past.push(previous);
        self.future.clear();
    }

    /// Swap the current entry for `location`.
    pub fn replace(&mut self, location: Location) {
        self.current = location;
    }

    /// Step back. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.future.push(current);
        true
    }

    /// Step forward. Returns `false` at the newest entry.
    pub fn forward(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.past.push(current);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_href() {
        let location = Location::parse("/?keyword=red%20shoes&page=2#top");
        assert_eq!(location.path(), "/");
        assert_eq!(location.param("keyword"), Some("red shoes"));
        assert_eq!(location.param("page"), Some("2"));
        assert_eq!(location.href(), "/?keyword=red+shoes&page=2");
    }

    #[test]
    fn test_parse_normalizes_path() {
        assert_eq!(Location::parse("").href(), "/");
        assert_eq!(Location::parse("cart").path(), "/cart");
        assert_eq!(Location::parse("?page=3").param("page"), Some("3"));
    }

    #[test]
    fn test_set_param_keeps_position_and_removes() {
        let mut location = Location::parse("/?keyword=phone&page=2&sort=new");
        location.set_param("page", Some("3"));
        assert_eq!(location.href(), "/?keyword=phone&page=3&sort=new");

        location.set_param("page", None);
        assert_eq!(location.href(), "/?keyword=phone&sort=new");

        location.set_param("page", Some("4"));
        assert_eq!(location.href(), "/?keyword=phone&sort=new&page=4");
    }

    #[test]
    fn test_serde_as_href() {
        let location = Location::parse("/product/p1?x=1");
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"/product/p1?x=1\"");
        assert_eq!(serde_json::from_str::<Location>(&json).unwrap(), location);
    }

    #[test]
    fn test_history_back_forward() {
        let mut history = History::default();
        history.push(Location::parse("/?page=2"));
        history.push(Location::parse("/?page=3"));

        assert!(history.back());
        assert_eq!(history.current().href(), "/?page=2");
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current().href(), "/");

        assert!(history.forward());
        history.push(Location::parse("/cart"));
        assert!(!history.forward());
        assert_eq!(history.current().href(), "/cart");
    }
}

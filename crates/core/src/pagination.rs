//! Pagination headers returned by collection endpoints of the upstream API.

use std::collections::BTreeMap;

use serde::Serialize;

/// Response headers copied out of a HEAD request; anything else is ignored.
pub const PAGINATION_HEADERS: [&str; 4] =
    ["X-Total-Count", "X-Count", "X-Link-Previous", "X-Link-Next"];

/// Whitelisted pagination headers that were present on a response.
///
/// Absent headers have no key at all (never an empty string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pagination(BTreeMap<String, String>);

impl Pagination {
    /// Collect the whitelisted headers using `lookup` to read a header by name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let headers = PAGINATION_HEADERS
            .iter()
            .filter_map(|&name| lookup(name).map(|value| (name.to_string(), value)))
            .collect();
        Self(headers)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn total_count(&self) -> Option<u64> {
        self.get("X-Total-Count").and_then(|v| v.trim().parse().ok())
    }

    pub fn count(&self) -> Option<u64> {
        self.get("X-Count").and_then(|v| v.trim().parse().ok())
    }

    pub fn previous(&self) -> Option<&str> {
        self.get("X-Link-Previous")
    }

    pub fn next(&self) -> Option<&str> {
        self.get("X-Link-Next")
    }
}

//! Header bag and header writer.
//!
//! # Responsibilities
//! - Hold request and response headers in one ordered, case-insensitive map
//! - Convert from the `http` crate's `HeaderMap`
//! - Write staged headers onto an outgoing response
//!
//! # Design Decisions
//! - Lookup is case-insensitive; the first spelling of a name is kept for output
//! - Setting an existing name replaces its value (like `setHeader`)
//! - Multi-valued request headers are joined with ", "
//! - Invalid names/values are skipped at write time, never fatal

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;

/// Ordered, case-insensitive string mapping of header names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    // lowercased name -> (name as first set, value)
    entries: IndexMap<String, (String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any value already stored under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(key, (name, value));
            }
        }
    }

    /// Builder-style [`HeaderBag::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .shift_remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Copy every header of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &HeaderBag) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a bag from an `http` header map.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut bag = Self::new();
        for name in headers.keys() {
            let joined = headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            bag.set(name.as_str(), joined);
        }
        bag
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.set(name, value);
        }
        bag
    }
}

/// Apply every header in `bag` onto `headers`, replacing existing values.
pub fn set_headers(headers: &mut HeaderMap, bag: &HeaderBag) {
    for (name, value) in bag.iter() {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "Skipping invalid response header");
            }
        }
    }
}

//! Multi-valued header map.
//!
//! Matches the header semantics of the worker's fetch surface: each name
//! maps to an ordered list of values, `get` returns the first value, and
//! `set` replaces the whole list. Names are compared verbatim; no case
//! normalization is applied before they cross the boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A header multimap for requests and responses.
///
/// # Examples
///
/// ```
/// use core_types::Headers;
///
/// let mut headers = Headers::new();
/// headers.append("Accept", "text/html");
/// headers.append("Accept", "application/json");
/// assert_eq!(headers.get("Accept"), Some("text/html"));
/// assert_eq!(headers.get_all("Accept").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a header map from name/value pairs, appending duplicates.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name, value);
        }
        headers
    }

    /// Appends a value to the list for `name`, creating the list if absent.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(name.into()).or_default().push(value.into());
    }

    /// Removes every value recorded for `name`.
    pub fn delete(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Returns the first value recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value recorded for `name`, if any.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Returns true if any value is recorded for `name`.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Replaces the value list for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), vec![value.into()]);
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, values)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

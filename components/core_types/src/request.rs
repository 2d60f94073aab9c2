//! Request value object.

use crate::headers::Headers;
use serde::{Deserialize, Serialize};

fn default_method() -> String {
    "GET".to_string()
}

/// A request reconstructed from a boundary descriptor.
///
/// The native shell intercepts the real network request and hands the
/// worker only this value: method, URL, and headers. Bodies never cross
/// into the worker on the request side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method, uppercase by convention.
    #[serde(default = "default_method")]
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
}

impl Request {
    /// Creates a request with the given method and empty headers.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Headers::new(),
        }
    }

    /// Creates a GET request, the default for a bare URL fetch.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }
}

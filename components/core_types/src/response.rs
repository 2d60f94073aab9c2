//! Response value objects and transport transcoding.
//!
//! Inside the worker a [`Response`] carries its body as text. Crossing
//! the host boundary, the body is base64-encoded into an
//! [`EncodedResponse`] so the transport never sees raw bytes it might
//! mangle. Decoding reverses the base64 and re-validates the text.

use crate::error::{WorkerError, WorkerResult};
use crate::headers::Headers;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A response as handler code sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response body as text.
    pub body: String,
    /// The URL the response answers for.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
}

impl Response {
    /// Creates a response.
    pub fn new(
        body: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        headers: Headers,
    ) -> Self {
        Self {
            body: body.into(),
            url: url.into(),
            status,
            headers,
        }
    }

    /// Creates a `200 OK` response with empty headers.
    pub fn ok(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(body, url, 200, Headers::new())
    }

    /// Returns true for a 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Encodes this response for the transport boundary.
    pub fn encode(&self) -> EncodedResponse {
        EncodedResponse {
            url: self.url.clone(),
            status: self.status,
            headers: self.headers.clone(),
            body: BASE64.encode(self.body.as_bytes()),
        }
    }
}

/// The transport-safe rendition of a [`Response`].
///
/// This is what crosses the boundary in both directions: responses a
/// handler supplies travel out encoded, and network fetch results arrive
/// encoded and are decoded before handler code sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedResponse {
    /// The URL the response answers for.
    pub url: String,
    /// HTTP status code.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Base64-encoded body.
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl EncodedResponse {
    /// Decodes the transport body back into an in-worker [`Response`].
    pub fn decode(&self) -> WorkerResult<Response> {
        let bytes = BASE64
            .decode(self.body.as_bytes())
            .map_err(|err| WorkerError::BodyEncoding(err.to_string()))?;
        let body = String::from_utf8(bytes)
            .map_err(|err| WorkerError::BodyEncoding(err.to_string()))?;
        Ok(Response {
            body,
            url: self.url.clone(),
            status: self.status,
            headers: self.headers.clone(),
        })
    }
}

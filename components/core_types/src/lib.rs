//! Core value types for the worker runtime.
//!
//! This crate provides the data containers that cross the host boundary:
//! - [`Headers`] - multi-valued header map for requests and responses
//! - [`Request`] - an intercepted request reconstructed from a descriptor
//! - [`Response`] - a response a handler can produce or a fetch can yield
//! - [`EncodedResponse`] - the transport-safe rendition of a [`Response`]
//! - [`WorkerError`] - the error type shared by all runtime components
//!
//! These are value objects: they carry no behavior beyond construction,
//! access, and transcoding between in-worker and transport form.
//!
//! # Examples
//!
//! ```
//! use core_types::{Headers, Request, Response};
//!
//! let request = Request::get("https://example.com/app.js");
//! assert_eq!(request.method, "GET");
//!
//! let response = Response::new("body", "https://example.com/app.js", 200, Headers::new());
//! let encoded = response.encode();
//! assert_eq!(encoded.decode().unwrap(), response);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod headers;
pub mod request;
pub mod response;

// Re-export main types at crate root
pub use error::{WorkerError, WorkerResult};
pub use headers::Headers;
pub use request::Request;
pub use response::{EncodedResponse, Response};

//! Host boundary contracts.
//!
//! Everything the core cannot do itself (real network fetches, response
//! delivery, message transport, cache persistence) goes through these
//! traits. The native shell implements them; tests implement recording
//! doubles.

use async_runtime::Completion;
use core_types::{EncodedResponse, Headers, Request};

/// Operations the native shell performs on the core's behalf.
pub trait HostBridge {
    /// Delivers a handler-supplied response for the request identified
    /// by `request_id`.
    fn deliver_fetch_response(&self, request_id: u64, response: EncodedResponse);

    /// Signals pass-through handling: the host performs the real network
    /// fetch for `url` itself.
    fn deliver_fetch_passthrough(&self, request_id: u64, url: &str);

    /// Asks the host to perform a real network request. The body of the
    /// eventual response arrives transport-encoded.
    fn perform_network_fetch(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
    ) -> Completion<EncodedResponse>;

    /// Posts a serialized message payload to the host.
    fn post_message_to_host(&self, payload: &str);
}

/// Cache persistence, delegated entirely to the host.
///
/// Entries are content-addressed by cache name plus request key; the
/// core never stores cache data itself.
pub trait CacheHost {
    /// Creates the named cache if it does not exist.
    fn open(&self, cache_name: &str) -> Completion<()>;

    /// Deletes the named cache. Resolves false if it did not exist.
    fn delete(&self, cache_name: &str) -> Completion<bool>;

    /// Looks up the response stored for `request` in the named cache.
    fn match_entry(
        &self,
        cache_name: &str,
        request: &Request,
    ) -> Completion<Option<EncodedResponse>>;

    /// Looks up every stored response matching `request`, or all entries
    /// when no request is given.
    fn match_all(
        &self,
        cache_name: &str,
        request: Option<&Request>,
    ) -> Completion<Vec<EncodedResponse>>;

    /// Stores `response` for `request` in the named cache.
    fn put(
        &self,
        cache_name: &str,
        request: &Request,
        response: &EncodedResponse,
    ) -> Completion<()>;

    /// Fetches `request` host-side and stores the result in the named
    /// cache.
    fn add(&self, cache_name: &str, request: &Request) -> Completion<()>;

    /// Removes the entry stored for `request`. Resolves false if absent.
    fn delete_entry(&self, cache_name: &str, request: &Request) -> Completion<bool>;

    /// Lists the request keys stored in the named cache.
    fn keys(&self, cache_name: &str) -> Completion<Vec<String>>;
}

//! Fetch interception pipeline.
//!
//! Routes an intercepted request through the fetch event: a handler may
//! supply a substitute response via `respondWith`, or the pass-through
//! default tells the host to perform the real network fetch itself.
//! Multiple fetches may be in flight at once; the request id is the only
//! thing correlating an event with its response sink.

use crate::event::WorkerEvent;
use crate::message::FetchDescriptor;
use crate::scope::ServiceWorkerGlobalScope;
use async_runtime::Completion;
use core_types::{Request, Response, WorkerResult};
use tracing::warn;

impl ServiceWorkerGlobalScope {
    /// Dispatches a fetch event for an intercepted request.
    ///
    /// Exactly one boundary delivery results: a response delivery if a
    /// handler responded, a pass-through with the original URL
    /// otherwise. The cancellation that suppresses the default happens
    /// synchronously inside dispatch; an asynchronous response source
    /// settling later can never race it. The returned completion
    /// resolves once deferred work registered on the event has settled
    /// (failures recorded, not delivered).
    pub fn handle_incoming_fetch(&self, descriptor: FetchDescriptor) -> Completion<()> {
        let FetchDescriptor {
            id: request_id,
            request,
            client,
            is_reload,
        } = descriptor;

        let client_index = client.map(|url| self.clients().create(url));
        let passthrough_url = request.url.clone();
        let mut event = WorkerEvent::fetch(request_id, request, client_index, is_reload);

        let bridge = self.bridge();
        let mut default_action = move |_event: &mut WorkerEvent| -> WorkerResult<()> {
            bridge.deliver_fetch_passthrough(request_id, &passthrough_url);
            Ok(())
        };
        self.event_target()
            .dispatch(&mut event, Some(&mut default_action));

        if let Some(source) = event.take_response() {
            let bridge = self.bridge();
            source.on_settle(move |result| match result {
                Ok(response) => bridge.deliver_fetch_response(request_id, response.encode()),
                Err(error) => {
                    warn!(request_id, %error, "respondWith source rejected; no response delivered");
                }
            });
        }

        let outcome = Completion::new();
        let waited = Completion::all(event.take_pending_work());
        let reported = outcome.clone();
        waited.on_settle(move |result| {
            if let Err(error) = result {
                warn!(request_id, %error, "fetch deferred work failed");
            }
            reported.resolve(());
        });
        outcome
    }

    /// Asks the host to perform a real network fetch and decodes the
    /// transport-encoded body before exposing the response.
    pub fn fetch(&self, request: Request) -> Completion<Response> {
        let fetched = Completion::new();
        let resolved = fetched.clone();
        self.bridge()
            .perform_network_fetch(&request.method, &request.url, &request.headers)
            .on_settle(move |result| match result {
                Ok(encoded) => match encoded.decode() {
                    Ok(response) => resolved.resolve(response),
                    Err(error) => resolved.reject(error),
                },
                Err(error) => resolved.reject(error.clone()),
            });
        fetched
    }

    /// Fetches a bare URL with the default GET request.
    pub fn fetch_url(&self, url: &str) -> Completion<Response> {
        self.fetch(Request::get(url))
    }
}

//! Unit tests for fetch interception

use crate::support::{scope_with, RecordingBridge};
use async_runtime::{Completion, CompletionState};
use core_types::{Headers, Response, WorkerError};
use std::rc::Rc;
use worker_platform::FetchDescriptor;

fn descriptor(id: u64, url: &str) -> FetchDescriptor {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "request": {"method": "GET", "url": url}
    }))
    .unwrap()
}

#[test]
fn unhandled_fetch_passes_through_with_the_original_url() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    scope.handle_incoming_fetch(descriptor(9, "https://example.com/page"));

    assert_eq!(
        *bridge.passthroughs.borrow(),
        vec![(9, "https://example.com/page".to_string())]
    );
    assert!(bridge.responses.borrow().is_empty());
}

#[test]
fn respond_with_suppresses_passthrough_and_delivers_once() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    scope.add_event_listener("fetch", |event| {
        let url = event.fetch_payload().map(|payload| payload.request.url.clone());
        event.respond_with_response(Response::ok("cached", url.unwrap_or_default()))
    });

    scope.handle_incoming_fetch(descriptor(3, "https://example.com/app.js"));

    assert!(bridge.passthroughs.borrow().is_empty());
    let responses = bridge.responses.borrow();
    assert_eq!(responses.len(), 1);
    let (request_id, encoded) = &responses[0];
    assert_eq!(*request_id, 3);
    assert_eq!(encoded.decode().unwrap().body, "cached");
}

#[test]
fn deferred_respond_with_delivers_when_the_source_settles() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let source: Completion<Response> = Completion::new();

    let pending = source.clone();
    scope.add_event_listener("fetch", move |event| {
        event.respond_with(pending.clone())
    });

    scope.handle_incoming_fetch(descriptor(5, "https://example.com/data"));
    assert!(bridge.passthroughs.borrow().is_empty());
    assert!(bridge.responses.borrow().is_empty());

    source.resolve(Response::ok("late body", "https://example.com/data"));
    let responses = bridge.responses.borrow();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].0, 5);
    assert_eq!(responses[0].1.decode().unwrap().body, "late body");
}

#[test]
fn concurrent_fetches_route_by_request_id() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let sources: Rc<std::cell::RefCell<Vec<(u64, Completion<Response>)>>> =
        Rc::new(std::cell::RefCell::new(Vec::new()));

    let registry = Rc::clone(&sources);
    scope.add_event_listener("fetch", move |event| {
        let request_id = event.fetch_payload().map(|payload| payload.request_id);
        let source = Completion::new();
        if let Some(request_id) = request_id {
            registry.borrow_mut().push((request_id, source.clone()));
        }
        event.respond_with(source)
    });

    scope.handle_incoming_fetch(descriptor(1, "https://example.com/one"));
    scope.handle_incoming_fetch(descriptor(2, "https://example.com/two"));

    // Resolve out of arrival order; deliveries must still carry the
    // matching ids.
    let captured = sources.borrow();
    captured[1].1.resolve(Response::ok("two", "https://example.com/two"));
    captured[0].1.resolve(Response::ok("one", "https://example.com/one"));

    let responses = bridge.responses.borrow();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].0, 2);
    assert_eq!(responses[0].1.decode().unwrap().body, "two");
    assert_eq!(responses[1].0, 1);
    assert_eq!(responses[1].1.decode().unwrap().body, "one");
}

#[test]
fn rejected_response_source_delivers_nothing() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let source: Completion<Response> = Completion::new();

    let pending = source.clone();
    scope.add_event_listener("fetch", move |event| {
        event.respond_with(pending.clone())
    });

    scope.handle_incoming_fetch(descriptor(8, "https://example.com/"));
    source.reject(WorkerError::Bridge("cache miss".to_string()));

    assert!(bridge.responses.borrow().is_empty());
    assert!(bridge.passthroughs.borrow().is_empty());
}

#[test]
fn fetch_event_client_lands_in_the_registry() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let descriptor: FetchDescriptor = serde_json::from_value(serde_json::json!({
        "id": 4,
        "request": {"method": "GET", "url": "https://example.com/img.png"},
        "client": "https://example.com/index.html",
        "isReload": false
    }))
    .unwrap();
    scope.handle_incoming_fetch(descriptor);

    let clients = scope.clients().get_all();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].url(), "https://example.com/index.html");
}

#[test]
fn fetch_deferred_work_extends_the_event_outcome() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let work: Completion<()> = Completion::new();

    let registered = work.clone();
    scope.add_event_listener("fetch", move |event| {
        event.wait_until(registered.clone())
    });

    let outcome = scope.handle_incoming_fetch(descriptor(6, "https://example.com/"));
    assert_eq!(outcome.state(), CompletionState::Pending);
    work.resolve(());
    assert_eq!(outcome.state(), CompletionState::Fulfilled);
}

#[test]
fn fetch_helper_decodes_the_network_body() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let fetched = scope.fetch_url("https://example.com/data.json");
    assert_eq!(
        *bridge.network_calls.borrow(),
        vec![("GET".to_string(), "https://example.com/data.json".to_string())]
    );
    assert_eq!(fetched.state(), CompletionState::Pending);

    let encoded = Response::new("{\"a\":1}", "https://example.com/data.json", 200, Headers::new())
        .encode();
    bridge.network_results.borrow()[0].resolve(encoded);

    assert_eq!(fetched.state(), CompletionState::Fulfilled);
    assert_eq!(fetched.value().unwrap().body, "{\"a\":1}");
}

#[test]
fn fetch_helper_propagates_network_failure() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let fetched = scope.fetch_url("https://example.com/");
    bridge.network_results.borrow()[0].reject(WorkerError::Bridge("offline".to_string()));

    assert_eq!(fetched.state(), CompletionState::Rejected);
    assert_eq!(
        fetched.error(),
        Some(WorkerError::Bridge("offline".to_string()))
    );
}

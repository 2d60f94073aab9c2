//! Unit tests for the global scope message entry point

use crate::support::{scope_with, RecordingBridge};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use worker_platform::{HostDirective, WorkerState};

#[test]
fn echo_messages_round_trip_to_the_host() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let directive = scope.on_incoming_message(&json!(["Echo", {"ping": true}]));
    assert!(directive.is_none());
    assert_eq!(*bridge.posted.borrow(), vec![r#"{"ping":true}"#.to_string()]);
}

#[test]
fn install_message_surfaces_an_import_scripts_directive() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let directive = scope.on_incoming_message(&json!(["Install", "sw.js", "helpers.js"]));
    assert_eq!(
        directive,
        Some(HostDirective::ImportScripts(vec![
            "sw.js".to_string(),
            "helpers.js".to_string()
        ]))
    );
}

#[test]
fn event_install_message_runs_the_lifecycle() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    scope.on_incoming_message(&json!(["Event", "Install"]));
    assert_eq!(scope.state(), WorkerState::Installed);

    scope.on_incoming_message(&json!(["Event", "Activate"]));
    assert_eq!(scope.state(), WorkerState::Activated);
}

#[test]
fn event_fetch_message_reaches_the_fetch_pipeline() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    scope.on_incoming_message(&json!([
        "Event",
        "Fetch",
        {"id": 21, "request": {"url": "https://example.com/style.css"}}
    ]));

    assert_eq!(
        *bridge.passthroughs.borrow(),
        vec![(21, "https://example.com/style.css".to_string())]
    );
}

#[test]
fn event_message_dispatches_with_its_data() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let seen = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&seen);
    scope.add_event_listener("message", move |event| {
        *slot.borrow_mut() = event
            .message_payload()
            .map(|payload| (payload.data.clone(), payload.origin.clone()));
        Ok(())
    });

    scope.on_incoming_message(&json!([
        "Event",
        "Message",
        {"data": [1, 2, 3], "origin": "https://example.com"}
    ]));

    let seen = seen.borrow();
    let (data, origin) = seen.as_ref().unwrap();
    assert_eq!(*data, json!([1, 2, 3]));
    assert_eq!(origin.as_deref(), Some("https://example.com"));
}

#[test]
fn unknown_message_kinds_are_ignored() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    assert!(scope.on_incoming_message(&json!(["ls"])).is_none());
    assert!(scope.on_incoming_message(&json!(["Inspect", "self"])).is_none());
    assert!(scope.on_incoming_message(&json!({"kind": "Echo"})).is_none());

    assert!(bridge.posted.borrow().is_empty());
    assert!(bridge.passthroughs.borrow().is_empty());
    assert_eq!(scope.state(), WorkerState::Parsed);
}

#[test]
fn post_message_serializes_the_payload() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    scope.post_message(&json!({"ready": 1})).unwrap();
    assert_eq!(*bridge.posted.borrow(), vec![r#"{"ready":1}"#.to_string()]);
}

#[test]
fn scope_timers_fire_on_host_ticks() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));
    let count = Rc::new(RefCell::new(0u32));

    let counter = Rc::clone(&count);
    scope.set_timeout(
        move || {
            *counter.borrow_mut() += 1;
            Ok(())
        },
        100,
    );

    assert_eq!(scope.tick(50), 0);
    assert_eq!(scope.tick(150), 1);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn handler_may_post_messages_during_dispatch() {
    let bridge = RecordingBridge::new();
    let scope = scope_with(Rc::clone(&bridge));

    let poster = scope.clone();
    scope.add_event_listener("message", move |_event| {
        poster.post_message(&json!("acknowledged"))
    });

    scope.on_incoming_message(&json!(["Event", "Message", {"data": "hello"}]));
    assert_eq!(*bridge.posted.borrow(), vec![r#""acknowledged""#.to_string()]);
}

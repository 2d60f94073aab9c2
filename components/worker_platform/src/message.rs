//! Inbound message decoding.
//!
//! The host posts JSON-shaped array descriptors into the worker:
//! `["Echo", value]`, `["Install", scriptUrl]`, or
//! `["Event", subType, params]`. Unknown kinds are ignored, logged at
//! debug so the host can notice misrouted traffic.

use core_types::Request;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Constructor parameters for a fetch event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchDescriptor {
    /// Correlation id pairing the event with its response sink.
    pub id: u64,
    /// The intercepted request.
    pub request: Request,
    /// URL of the originating client, when the shell knows it.
    #[serde(default)]
    pub client: Option<String>,
    /// True when the request is a page reload.
    #[serde(default, rename = "isReload")]
    pub is_reload: bool,
}

/// Constructor parameters for a message event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageDescriptor {
    /// The posted data.
    #[serde(default)]
    pub data: Value,
    /// Origin of the poster.
    #[serde(default)]
    pub origin: Option<String>,
    /// Identity of the poster.
    #[serde(default)]
    pub source: Option<String>,
}

/// The event sub-kinds an `["Event", ...]` descriptor may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDescriptor {
    /// Dispatch a fetch event.
    Fetch(FetchDescriptor),
    /// Fire the install lifecycle phase.
    Install,
    /// Fire the activate lifecycle phase.
    Activate,
    /// Dispatch a message event.
    Message(MessageDescriptor),
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    /// Post the payload straight back to the host.
    Echo(Value),
    /// The host asks the shell to evaluate worker scripts; surfaced as
    /// a directive since script evaluation is not the core's job.
    ImportScripts(Vec<String>),
    /// Construct and dispatch an event.
    Event(EventDescriptor),
}

/// An action the embedder must perform on the core's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum HostDirective {
    /// Evaluate the given scripts in the worker context.
    ImportScripts(Vec<String>),
}

/// Decodes an inbound descriptor.
///
/// Returns `None` for anything that should be ignored: non-array
/// descriptors, unknown kinds, and known kinds with malformed
/// parameters (the latter logged at warn).
pub fn decode_message(descriptor: &Value) -> Option<IncomingMessage> {
    let items = match descriptor.as_array() {
        Some(items) => items,
        None => {
            debug!("ignoring non-array message descriptor");
            return None;
        }
    };
    let kind = items.first().and_then(Value::as_str)?;
    match kind {
        "Echo" => Some(IncomingMessage::Echo(
            items.get(1).cloned().unwrap_or(Value::Null),
        )),
        "Install" => {
            let scripts: Vec<String> = items[1..]
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            Some(IncomingMessage::ImportScripts(scripts))
        }
        "Event" => decode_event(items).map(IncomingMessage::Event),
        other => {
            debug!(kind = other, "ignoring unknown message kind");
            None
        }
    }
}

fn decode_event(items: &[Value]) -> Option<EventDescriptor> {
    let sub_kind = match items.get(1).and_then(Value::as_str) {
        Some(sub_kind) => sub_kind,
        None => {
            debug!("ignoring Event descriptor without a sub-kind");
            return None;
        }
    };
    match sub_kind {
        "Fetch" => {
            let params = items.get(2).cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<FetchDescriptor>(params) {
                Ok(descriptor) => Some(EventDescriptor::Fetch(descriptor)),
                Err(error) => {
                    warn!(%error, "malformed Fetch event parameters");
                    None
                }
            }
        }
        "Install" => Some(EventDescriptor::Install),
        "Activate" => Some(EventDescriptor::Activate),
        "Message" => {
            let params = items.get(2).cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<MessageDescriptor>(params) {
                Ok(descriptor) => Some(EventDescriptor::Message(descriptor)),
                Err(error) => {
                    warn!(%error, "malformed Message event parameters");
                    None
                }
            }
        }
        other => {
            debug!(sub_kind = other, "ignoring unknown event sub-kind");
            None
        }
    }
}

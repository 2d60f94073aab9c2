//! Event model: typed event variants over a shared cancellation core.
//!
//! The browser's prototype chain (Event → ExtendableEvent →
//! InstallEvent/FetchEvent) becomes a tagged variant: every event
//! carries the base capability set (type tag, cancelable flag, canceled
//! flag, dispatch phase) plus a payload variant for the data and
//! operations specific to its kind. Events are created per dispatch and
//! never reused; handlers must not assume object identity persists
//! across dispatches.

use async_runtime::Completion;
use core_types::{Request, Response, WorkerError, WorkerResult};

/// Interned event type keys.
pub mod event_type {
    /// Fired once while the worker installs.
    pub const INSTALL: &str = "install";
    /// Fired once when the installed worker activates.
    pub const ACTIVATE: &str = "activate";
    /// Fired for every intercepted request.
    pub const FETCH: &str = "fetch";
    /// Fired for messages posted into the worker.
    pub const MESSAGE: &str = "message";
}

/// Dispatch phase of a single event instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Constructed, not yet entered dispatch.
    Created,
    /// Inside a dispatch pass.
    Dispatching,
    /// Dispatch finished with the event canceled.
    Canceled,
    /// Dispatch finished uncanceled.
    Completed,
}

/// Deferred-work tracking shared by the extendable event variants.
///
/// Starts with no allocation; the first `waitUntil` call creates the
/// list.
#[derive(Default)]
struct ExtendableState {
    pending: Option<Vec<Completion<()>>>,
}

impl ExtendableState {
    fn extend(&mut self, work: Completion<()>) {
        self.pending.get_or_insert_with(Vec::new).push(work);
    }

    fn take(&mut self) -> Vec<Completion<()>> {
        self.pending.take().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }
}

/// Payload of a fetch event.
pub struct FetchPayload {
    /// Correlates this event with the cross-boundary request it came
    /// from, so concurrent fetches route to the right response sink.
    pub request_id: u64,
    /// The intercepted request.
    pub request: Request,
    /// Index of the originating client in the client registry, if known.
    pub client: Option<usize>,
    /// True when the request is a reload of the page.
    pub is_reload: bool,
    extendable: ExtendableState,
    response: Option<Completion<Response>>,
}

/// Payload of a message event.
pub struct MessagePayload {
    /// The posted data.
    pub data: serde_json::Value,
    /// Origin of the poster, when supplied.
    pub origin: Option<String>,
    /// Identity of the poster, when supplied.
    pub source: Option<String>,
}

enum EventPayload {
    Plain,
    Lifecycle(ExtendableState),
    Fetch(FetchPayload),
    Message(MessagePayload),
}

/// An event flowing through the worker's dispatch system.
///
/// # Examples
///
/// ```
/// use worker_platform::{event_type, WorkerEvent};
///
/// let mut event = WorkerEvent::new(event_type::MESSAGE, true);
/// assert!(!event.is_canceled());
/// event.prevent_default();
/// assert!(event.is_canceled());
/// ```
pub struct WorkerEvent {
    event_type: String,
    cancelable: bool,
    canceled: bool,
    phase: EventPhase,
    payload: EventPayload,
}

impl WorkerEvent {
    /// Creates a plain event with no variant payload.
    pub fn new(event_type: &str, cancelable: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            cancelable,
            canceled: false,
            phase: EventPhase::Created,
            payload: EventPayload::Plain,
        }
    }

    /// Creates an extendable lifecycle event (install, activate).
    pub fn extendable(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            cancelable: true,
            canceled: false,
            phase: EventPhase::Created,
            payload: EventPayload::Lifecycle(ExtendableState::default()),
        }
    }

    /// Creates a fetch event for an intercepted request.
    pub fn fetch(
        request_id: u64,
        request: Request,
        client: Option<usize>,
        is_reload: bool,
    ) -> Self {
        Self {
            event_type: event_type::FETCH.to_string(),
            cancelable: true,
            canceled: false,
            phase: EventPhase::Created,
            payload: EventPayload::Fetch(FetchPayload {
                request_id,
                request,
                client,
                is_reload,
                extendable: ExtendableState::default(),
                response: None,
            }),
        }
    }

    /// Creates a message event.
    pub fn message(
        data: serde_json::Value,
        origin: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            event_type: event_type::MESSAGE.to_string(),
            cancelable: true,
            canceled: false,
            phase: EventPhase::Created,
            payload: EventPayload::Message(MessagePayload {
                data,
                origin,
                source,
            }),
        }
    }

    /// The event's type tag.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// True if `prevent_default` can cancel this event.
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// True once the event has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// The dispatch phase this event instance is in.
    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// Cancels the event, suppressing its default action. Has no effect
    /// on a non-cancelable event.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.canceled = true;
        }
    }

    /// Extends the event's lifetime until `work` settles.
    ///
    /// Only extendable events (lifecycle and fetch) accept deferred
    /// work; calling this on any other event is an invalid-state error.
    pub fn wait_until(&mut self, work: Completion<()>) -> WorkerResult<()> {
        match &mut self.payload {
            EventPayload::Lifecycle(state) => {
                state.extend(work);
                Ok(())
            }
            EventPayload::Fetch(payload) => {
                payload.extendable.extend(work);
                Ok(())
            }
            _ => Err(WorkerError::InvalidState(format!(
                "'{}' event does not accept deferred work",
                self.event_type
            ))),
        }
    }

    /// Supplies a substitute response for a fetch event.
    ///
    /// Cancels the event so the pass-through default never runs, and
    /// records the source; the interception pipeline delivers the
    /// response once the source settles. A second call is an error.
    pub fn respond_with(&mut self, source: Completion<Response>) -> WorkerResult<()> {
        let event_type = self.event_type.clone();
        match &mut self.payload {
            EventPayload::Fetch(payload) => {
                if payload.response.is_some() {
                    return Err(WorkerError::InvalidState(
                        "respondWith already called for this fetch event".to_string(),
                    ));
                }
                payload.response = Some(source);
            }
            _ => {
                return Err(WorkerError::InvalidState(format!(
                    "'{event_type}' event cannot carry a response"
                )))
            }
        }
        self.prevent_default();
        Ok(())
    }

    /// Supplies an immediately available substitute response.
    pub fn respond_with_response(&mut self, response: Response) -> WorkerResult<()> {
        self.respond_with(Completion::fulfilled(response))
    }

    /// The fetch payload, if this is a fetch event.
    pub fn fetch_payload(&self) -> Option<&FetchPayload> {
        match &self.payload {
            EventPayload::Fetch(payload) => Some(payload),
            _ => None,
        }
    }

    /// The message payload, if this is a message event.
    pub fn message_payload(&self) -> Option<&MessagePayload> {
        match &self.payload {
            EventPayload::Message(payload) => Some(payload),
            _ => None,
        }
    }

    /// The number of deferred operations registered so far.
    pub fn pending_work_len(&self) -> usize {
        match &self.payload {
            EventPayload::Lifecycle(state) => state.len(),
            EventPayload::Fetch(payload) => payload.extendable.len(),
            _ => 0,
        }
    }

    pub(crate) fn begin_dispatch(&mut self) {
        if self.phase == EventPhase::Created {
            self.phase = EventPhase::Dispatching;
        }
    }

    pub(crate) fn finish_dispatch(&mut self) {
        self.phase = if self.canceled {
            EventPhase::Canceled
        } else {
            EventPhase::Completed
        };
    }

    pub(crate) fn take_pending_work(&mut self) -> Vec<Completion<()>> {
        match &mut self.payload {
            EventPayload::Lifecycle(state) => state.take(),
            EventPayload::Fetch(payload) => payload.extendable.take(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn take_response(&mut self) -> Option<Completion<Response>> {
        match &mut self.payload {
            EventPayload::Fetch(payload) => payload.response.take(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for WorkerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerEvent")
            .field("event_type", &self.event_type)
            .field("cancelable", &self.cancelable)
            .field("canceled", &self.canceled)
            .field("phase", &self.phase)
            .finish()
    }
}

//! Listener registry and event dispatch.
//!
//! A minimal publish/subscribe registry: multiple listeners per event
//! type invoked in registration order, plus single-slot property
//! handlers (`oninstall`-style) that alias one entry of the ordered
//! sequence. Dispatch iterates over a snapshot, so a handler that
//! registers new listeners for the type currently dispatching does not
//! affect the in-flight pass.

use crate::event::WorkerEvent;
use core_types::WorkerResult;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// A registered event listener.
pub type Listener = Rc<RefCell<dyn FnMut(&mut WorkerEvent) -> WorkerResult<()>>>;

/// The fallback behavior for an event type, run only if no listener
/// canceled the event.
pub type DefaultAction<'a> = &'a mut dyn FnMut(&mut WorkerEvent) -> WorkerResult<()>;

#[derive(Default)]
struct Registry {
    listeners: HashMap<String, Vec<Listener>>,
    property_slots: HashMap<String, usize>,
}

/// The worker's event target.
///
/// A cloneable handle to process-wide listener state; handler code may
/// hold a clone and add listeners mid-dispatch without disturbing the
/// pass already underway.
///
/// # Examples
///
/// ```
/// use worker_platform::{EventTarget, WorkerEvent};
///
/// let target = EventTarget::new();
/// target.add_listener("ping", |_event| Ok(()));
/// let mut event = WorkerEvent::new("ping", true);
/// target.dispatch(&mut event, None);
/// ```
#[derive(Clone, Default)]
pub struct EventTarget {
    registry: Rc<RefCell<Registry>>,
}

impl EventTarget {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the listener sequence for `event_type`.
    ///
    /// Always appends; registering the same handler twice invokes it
    /// twice per dispatch.
    pub fn add_listener<F>(&self, event_type: &str, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> WorkerResult<()> + 'static,
    {
        let listener: Listener = Rc::new(RefCell::new(handler));
        self.registry
            .borrow_mut()
            .listeners
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    /// Installs the single-slot property handler for `event_type`.
    ///
    /// The first write registers a new listener at the end of the
    /// sequence and records its index; later writes overwrite that entry
    /// in place: no growth, no reordering. Following the event-handler
    /// processing algorithm, a handler returning `false` cancels the
    /// event.
    pub fn set_property_handler<F>(&self, event_type: &str, mut handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> bool + 'static,
    {
        let wrapped: Listener = Rc::new(RefCell::new(move |event: &mut WorkerEvent| {
            if !handler(event) {
                event.prevent_default();
            }
            Ok(())
        }));

        let mut registry = self.registry.borrow_mut();
        let Registry {
            listeners,
            property_slots,
        } = &mut *registry;
        match property_slots.get(event_type) {
            Some(&index) => {
                if let Some(slot) = listeners
                    .get_mut(event_type)
                    .and_then(|sequence| sequence.get_mut(index))
                {
                    *slot = wrapped;
                }
            }
            None => {
                let sequence = listeners.entry(event_type.to_string()).or_default();
                sequence.push(wrapped);
                property_slots.insert(event_type.to_string(), sequence.len() - 1);
            }
        }
    }

    /// True once a property handler has been installed for `event_type`.
    pub fn property_handler_installed(&self, event_type: &str) -> bool {
        self.registry
            .borrow()
            .property_slots
            .contains_key(event_type)
    }

    /// The number of listeners registered for `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Dispatches `event` to every listener registered for its type, in
    /// registration order.
    ///
    /// A listener failure is logged and does not prevent subsequent
    /// listeners in the same pass from running. After all listeners, the
    /// default action runs with the event, unless the event was
    /// canceled, in which case it is skipped. The cancellation check
    /// happens here, synchronously, before any asynchronous response
    /// resolution can race it.
    pub fn dispatch(&self, event: &mut WorkerEvent, default_action: Option<DefaultAction<'_>>) {
        event.begin_dispatch();
        let snapshot: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .get(event.event_type())
            .cloned()
            .unwrap_or_default();

        let event_type = event.event_type().to_string();
        for listener in snapshot {
            let result = (&mut *listener.borrow_mut())(event);
            if let Err(error) = result {
                warn!(event_type = %event_type, %error, "event listener failed");
            }
        }

        if !event.is_canceled() {
            if let Some(action) = default_action {
                if let Err(error) = action(event) {
                    warn!(event_type = %event_type, %error, "default action failed");
                }
            }
        }
        event.finish_dispatch();
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventTarget")
            .field("event_types", &registry.listeners.len())
            .finish()
    }
}

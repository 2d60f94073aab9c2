//! The worker global scope.
//!
//! One explicit context object owns every piece of process-wide state:
//! listener registry, event loop, client registry, lifecycle
//! bookkeeping, cache facade, and the bridge handle. There are no
//! implicit globals; everything handler code can reach hangs off a
//! scope handle.

use crate::bridge::{CacheHost, HostBridge};
use crate::cache::CacheStorage;
use crate::client::Clients;
use crate::event::{event_type, WorkerEvent};
use crate::event_target::EventTarget;
use crate::lifecycle::{LifecycleDriver, LifecyclePolicy, WorkerState};
use crate::message::{decode_message, EventDescriptor, HostDirective, IncomingMessage};
use async_runtime::{EventLoop, TimerId};
use core_types::{WorkerError, WorkerResult};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

struct ScopeInner {
    target: EventTarget,
    event_loop: EventLoop,
    clients: Clients,
    caches: CacheStorage,
    bridge: Rc<dyn HostBridge>,
    lifecycle: RefCell<LifecycleDriver>,
}

/// The service worker global scope.
///
/// A cloneable handle; handler closures capture clones to reach the
/// registries. All mutation happens on the single cooperative thread,
/// so interior mutability replaces locking throughout.
#[derive(Clone)]
pub struct ServiceWorkerGlobalScope {
    inner: Rc<ScopeInner>,
}

impl ServiceWorkerGlobalScope {
    /// Creates a scope with the default lifecycle policy.
    pub fn new(bridge: Rc<dyn HostBridge>, cache_host: Rc<dyn CacheHost>) -> Self {
        Self::with_policy(bridge, cache_host, LifecyclePolicy::default())
    }

    /// Creates a scope with an explicit install-failure policy.
    pub fn with_policy(
        bridge: Rc<dyn HostBridge>,
        cache_host: Rc<dyn CacheHost>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                target: EventTarget::new(),
                event_loop: EventLoop::new(),
                clients: Clients::new(),
                caches: CacheStorage::new(cache_host),
                bridge,
                lifecycle: RefCell::new(LifecycleDriver::new(policy)),
            }),
        }
    }

    /// Registers a listener for `event_type`.
    pub fn add_event_listener<F>(&self, event_type: &str, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> WorkerResult<()> + 'static,
    {
        self.inner.target.add_listener(event_type, handler);
    }

    /// Assigns the `oninstall` property handler slot.
    pub fn set_oninstall<F>(&self, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> bool + 'static,
    {
        self.inner
            .target
            .set_property_handler(event_type::INSTALL, handler);
    }

    /// Assigns the `onactivate` property handler slot.
    pub fn set_onactivate<F>(&self, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> bool + 'static,
    {
        self.inner
            .target
            .set_property_handler(event_type::ACTIVATE, handler);
    }

    /// Assigns the `onfetch` property handler slot.
    pub fn set_onfetch<F>(&self, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> bool + 'static,
    {
        self.inner
            .target
            .set_property_handler(event_type::FETCH, handler);
    }

    /// Assigns the `onmessage` property handler slot.
    pub fn set_onmessage<F>(&self, handler: F)
    where
        F: FnMut(&mut WorkerEvent) -> bool + 'static,
    {
        self.inner
            .target
            .set_property_handler(event_type::MESSAGE, handler);
    }

    /// Dispatches an event with no default action.
    pub fn dispatch_event(&self, event: &mut WorkerEvent) {
        self.inner.target.dispatch(event, None);
    }

    /// Entry point for descriptors posted by the host.
    ///
    /// Echo and event descriptors are handled in place; a descriptor
    /// the embedder must act on (script evaluation) is returned as a
    /// directive. Unknown kinds are ignored.
    pub fn on_incoming_message(&self, descriptor: &serde_json::Value) -> Option<HostDirective> {
        match decode_message(descriptor)? {
            IncomingMessage::Echo(payload) => {
                match serde_json::to_string(&payload) {
                    Ok(serialized) => self.inner.bridge.post_message_to_host(&serialized),
                    Err(error) => warn!(%error, "echo payload failed to serialize"),
                }
                None
            }
            IncomingMessage::ImportScripts(scripts) => {
                Some(HostDirective::ImportScripts(scripts))
            }
            IncomingMessage::Event(EventDescriptor::Fetch(descriptor)) => {
                self.handle_incoming_fetch(descriptor);
                None
            }
            IncomingMessage::Event(EventDescriptor::Install) => {
                self.fire_install();
                None
            }
            IncomingMessage::Event(EventDescriptor::Activate) => {
                self.fire_activate();
                None
            }
            IncomingMessage::Event(EventDescriptor::Message(descriptor)) => {
                let mut event =
                    WorkerEvent::message(descriptor.data, descriptor.origin, descriptor.source);
                self.dispatch_event(&mut event);
                None
            }
        }
    }

    /// Serializes a payload and posts it to the host.
    pub fn post_message(&self, payload: &serde_json::Value) -> WorkerResult<()> {
        let serialized = serde_json::to_string(payload)
            .map_err(|error| WorkerError::MalformedMessage(error.to_string()))?;
        self.inner.bridge.post_message_to_host(&serialized);
        Ok(())
    }

    /// Drives the timer queue; called by the host on its tick cadence.
    pub fn tick(&self, current_time: u64) -> usize {
        self.inner.event_loop.tick(current_time)
    }

    /// Schedules a one-shot callback on the worker's event loop.
    pub fn set_timeout<F>(&self, callback: F, delay_ms: u64) -> TimerId
    where
        F: Fn() -> WorkerResult<()> + 'static,
    {
        self.inner.event_loop.set_timeout(callback, delay_ms)
    }

    /// Schedules a repeating callback on the worker's event loop.
    pub fn set_interval<F>(&self, callback: F, delay_ms: u64) -> TimerId
    where
        F: Fn() -> WorkerResult<()> + 'static,
    {
        self.inner.event_loop.set_interval(callback, delay_ms)
    }

    /// Cancels a scheduled callback. Unknown ids are ignored.
    pub fn clear_timer(&self, id: TimerId) {
        self.inner.event_loop.clear_timer(id);
    }

    /// The worker's event loop.
    pub fn event_loop(&self) -> &EventLoop {
        &self.inner.event_loop
    }

    /// The client registry.
    pub fn clients(&self) -> Clients {
        self.inner.clients.clone()
    }

    /// The cache facade.
    pub fn caches(&self) -> CacheStorage {
        self.inner.caches.clone()
    }

    /// The worker's lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.inner.lifecycle.borrow().state()
    }

    /// True once an install deferred operation has failed.
    pub fn install_failed(&self) -> bool {
        self.inner.lifecycle.borrow().install_failed()
    }

    pub(crate) fn event_target(&self) -> EventTarget {
        self.inner.target.clone()
    }

    pub(crate) fn bridge(&self) -> Rc<dyn HostBridge> {
        Rc::clone(&self.inner.bridge)
    }

    pub(crate) fn with_lifecycle<R>(&self, f: impl FnOnce(&mut LifecycleDriver) -> R) -> R {
        f(&mut self.inner.lifecycle.borrow_mut())
    }
}

impl std::fmt::Debug for ServiceWorkerGlobalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorkerGlobalScope")
            .field("state", &self.state())
            .field("clients", &self.inner.clients.len())
            .finish()
    }
}

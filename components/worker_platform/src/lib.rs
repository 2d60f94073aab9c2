//! Service worker platform emulation for a native shell host.
//!
//! Implements the worker-facing half of the Service Worker platform:
//! event dispatch, the extendable-event lifecycle (install / activate /
//! fetch), fetch interception, client messaging, and a cache facade,
//! all inside a context that has no native event target, timers, or
//! fetch. The native shell is reached exclusively through the
//! [`HostBridge`] and [`CacheHost`] traits; time is driven by the host
//! through [`ServiceWorkerGlobalScope::tick`].

pub mod bridge;
pub mod cache;
pub mod client;
pub mod event;
pub mod event_target;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod scope;

// Re-export main types
pub use bridge::{CacheHost, HostBridge};
pub use cache::{Cache, CacheStorage};
pub use client::{Client, Clients};
pub use event::{event_type, EventPhase, FetchPayload, MessagePayload, WorkerEvent};
pub use event_target::EventTarget;
pub use lifecycle::{LifecyclePolicy, WorkerState};
pub use message::{
    decode_message, EventDescriptor, FetchDescriptor, HostDirective, IncomingMessage,
    MessageDescriptor,
};
pub use scope::ServiceWorkerGlobalScope;

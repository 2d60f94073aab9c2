//! Error types for the worker runtime.
//!
//! No failure from this layer is fatal to the worker process. Listener
//! and deferred-work faults are recorded or logged by the dispatching
//! component; only genuinely unrecoverable data problems (a descriptor
//! that cannot be decoded, a body that is not valid transport encoding)
//! surface as errors to callers.

use thiserror::Error;

/// Errors produced by the worker runtime components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// An individual event listener raised during a dispatch pass.
    #[error("listener fault during '{event_type}' dispatch: {message}")]
    ListenerFault {
        /// The event type being dispatched when the listener raised.
        event_type: String,
        /// Description of the listener failure.
        message: String,
    },

    /// A deferred operation registered via `waitUntil` failed.
    #[error("deferred work failed: {0}")]
    DeferredWork(String),

    /// An inbound message descriptor had a known kind but a malformed shape.
    #[error("malformed message descriptor: {0}")]
    MalformedMessage(String),

    /// A transport-encoded body could not be decoded.
    #[error("body transcoding failed: {0}")]
    BodyEncoding(String),

    /// The host collaborator reported a failure.
    #[error("host bridge error: {0}")]
    Bridge(String),

    /// An operation was attempted on an object in a state that forbids it.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result alias used across the worker runtime.
pub type WorkerResult<T> = Result<T, WorkerError>;

//! Software event loop for the worker runtime.
//!
//! The embedding context has no native timers and no ambient clock, so
//! this crate reimplements delayed and periodic callback scheduling in
//! software. The host drives time by calling [`EventLoop::tick`] with
//! its own clock; nothing here ever sleeps or spawns a thread.
//!
//! - [`TimerQueue`] - the scheduled-task set with sweep-based delivery
//! - [`EventLoop`] - the facade the worker scope exposes to the host
//! - [`Completion`] - the deferred-completion primitive event handlers
//!   use to extend an event's lifetime
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let event_loop = EventLoop::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//! event_loop.set_timeout(move || { flag.set(true); Ok(()) }, 100);
//!
//! event_loop.tick(50);
//! assert!(!fired.get());
//! event_loop.tick(150);
//! assert!(fired.get());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod event_loop;
pub mod timer_queue;

// Re-export main types at crate root
pub use completion::{Completion, CompletionState};
pub use event_loop::EventLoop;
pub use timer_queue::{TimerId, TimerQueue};

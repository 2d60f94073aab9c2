//! Event loop facade driven by host ticks.
//!
//! The worker scope exposes this loop to the host. It owns the
//! [`TimerQueue`] and presents the polyfill's scheduling surface
//! (`setTimeout` / `setInterval` / `clearTimeout`); the host supplies
//! the clock by calling [`EventLoop::tick`] on its own cadence.

use crate::timer_queue::{TimerId, TimerQueue};
use core_types::WorkerResult;

/// The worker's software event loop.
///
/// A cloneable handle: clones share the same timer set, so handler code
/// holding a clone can schedule work that the host's next tick delivers.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
///
/// let event_loop = EventLoop::new();
/// let id = event_loop.set_timeout(|| Ok(()), 250);
/// event_loop.clear_timer(id);
/// assert!(!event_loop.has_pending_timers());
/// ```
#[derive(Clone, Default)]
pub struct EventLoop {
    timers: TimerQueue,
}

impl EventLoop {
    /// Creates a loop with an empty timer set.
    pub fn new() -> Self {
        Self {
            timers: TimerQueue::new(),
        }
    }

    /// Schedules a one-shot callback `delay_ms` from the current tick.
    pub fn set_timeout<F>(&self, callback: F, delay_ms: u64) -> TimerId
    where
        F: Fn() -> WorkerResult<()> + 'static,
    {
        self.timers.schedule(callback, delay_ms, false)
    }

    /// Schedules a repeating callback every `delay_ms`.
    pub fn set_interval<F>(&self, callback: F, delay_ms: u64) -> TimerId
    where
        F: Fn() -> WorkerResult<()> + 'static,
    {
        self.timers.schedule(callback, delay_ms, true)
    }

    /// Cancels a scheduled callback. Unknown ids are ignored.
    pub fn clear_timer(&self, id: TimerId) {
        self.timers.cancel(id);
    }

    /// Runs one sweep at `current_time`; returns how many callbacks ran.
    pub fn tick(&self, current_time: u64) -> usize {
        self.timers.advance(current_time)
    }

    /// Returns true while any timer remains scheduled.
    pub fn has_pending_timers(&self) -> bool {
        self.timers.has_pending()
    }

    /// The timestamp of the most recent tick.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// The underlying timer queue.
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("timers", &self.timers)
            .finish()
    }
}

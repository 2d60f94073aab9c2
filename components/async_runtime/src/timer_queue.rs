//! Software timer queue with sweep-based delivery.
//!
//! The queue keeps every scheduled task in a flat live set. The host
//! calls [`TimerQueue::advance`] with its clock; one sweep runs every
//! task that is ready and due, retains the rest unchanged, and
//! reschedules repeating tasks from the invocation time (not
//! drift-corrected from the original schedule). The queue's own notion
//! of "now" is only ever the timestamp of the most recent sweep.

use core_types::WorkerResult;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;

/// Identifier handed back by [`TimerQueue::schedule`] for cancellation.
pub type TimerId = u64;

/// Callback invoked with no arguments when a scheduled task comes due.
pub type TimerCallback = Rc<dyn Fn() -> WorkerResult<()>>;

struct ScheduledTask {
    id: TimerId,
    due_time: u64,
    ready: bool,
    running: bool,
    finished: bool,
    repeating: bool,
    delay_ms: u64,
    callback: TimerCallback,
}

struct QueueInner {
    tasks: RefCell<Vec<ScheduledTask>>,
    next_id: Cell<TimerId>,
    now: Cell<u64>,
}

/// The scheduled-task set.
///
/// The handle is cloneable so callbacks may re-enter the queue to
/// schedule or cancel while a sweep is in progress; the sweep iterates
/// over the tasks it captured, and re-entrant mutations only affect the
/// live set.
///
/// # Examples
///
/// ```
/// use async_runtime::TimerQueue;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let queue = TimerQueue::new();
/// let count = Rc::new(Cell::new(0u32));
/// let counter = Rc::clone(&count);
/// queue.schedule(move || { counter.set(counter.get() + 1); Ok(()) }, 100, false);
///
/// queue.advance(150);
/// queue.advance(200);
/// assert_eq!(count.get(), 1);
/// ```
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<QueueInner>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    /// Creates an empty queue with its clock at zero.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(QueueInner {
                tasks: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                now: Cell::new(0),
            }),
        }
    }

    /// The timestamp of the most recent sweep.
    pub fn now(&self) -> u64 {
        self.inner.now.get()
    }

    /// Schedules `callback` to run `delay_ms` after the current sweep
    /// time, and again after every `delay_ms` if `repeating`.
    pub fn schedule<F>(&self, callback: F, delay_ms: u64, repeating: bool) -> TimerId
    where
        F: Fn() -> WorkerResult<()> + 'static,
    {
        self.schedule_callback(Rc::new(callback), delay_ms, repeating)
    }

    fn schedule_callback(
        &self,
        callback: TimerCallback,
        delay_ms: u64,
        repeating: bool,
    ) -> TimerId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.push_task(id, callback, delay_ms, repeating);
        id
    }

    fn push_task(&self, id: TimerId, callback: TimerCallback, delay_ms: u64, repeating: bool) {
        self.inner.tasks.borrow_mut().push(ScheduledTask {
            id,
            due_time: self.inner.now.get() + delay_ms,
            ready: true,
            running: false,
            finished: false,
            repeating,
            delay_ms,
            callback,
        });
    }

    /// Removes the task with `id` from the live set. Cancelling a
    /// finished or unknown id is a no-op, never an error.
    pub fn cancel(&self, id: TimerId) {
        self.inner.tasks.borrow_mut().retain(|task| task.id != id);
    }

    /// Gates a task: an unready task is never run, no matter how stale.
    /// Unknown ids are ignored.
    pub fn set_ready(&self, id: TimerId, ready: bool) {
        let mut tasks = self.inner.tasks.borrow_mut();
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            task.ready = ready;
        }
    }

    /// Runs every ready task due at `current_time` and retains the rest.
    ///
    /// Returns the number of callbacks invoked. Finished tasks leave the
    /// set, so re-invoking with the same timestamp runs nothing twice. A
    /// callback failure is logged and does not disturb the rest of the
    /// sweep; a repeating task is rescheduled either way, keeping its id
    /// so `cancel` still stops the series.
    pub fn advance(&self, current_time: u64) -> usize {
        self.inner.now.set(current_time);

        let swept = self.inner.tasks.take();
        let mut due = Vec::new();
        let mut retained = Vec::with_capacity(swept.len());
        for task in swept {
            if task.ready && !task.running && !task.finished && task.due_time <= current_time {
                due.push(task);
            } else {
                retained.push(task);
            }
        }
        // Restore the retained set before any callback runs, so
        // re-entrant schedule/cancel calls observe a consistent queue.
        *self.inner.tasks.borrow_mut() = retained;

        let mut fired = 0;
        for mut task in due {
            task.running = true;
            if let Err(error) = (task.callback)() {
                warn!(timer_id = task.id, %error, "timer callback failed");
            }
            task.finished = true;
            fired += 1;
            if task.repeating {
                self.push_task(task.id, Rc::clone(&task.callback), task.delay_ms, true);
            }
        }
        fired
    }

    /// Returns true while any task remains in the live set.
    pub fn has_pending(&self) -> bool {
        !self.inner.tasks.borrow().is_empty()
    }

    /// Returns the number of tasks in the live set.
    pub fn len(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Returns true if the live set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.borrow().is_empty()
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now())
            .field("pending", &self.len())
            .finish()
    }
}

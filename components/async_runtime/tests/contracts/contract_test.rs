//! Contract tests for the async_runtime component
//!
//! These tests pin the externally observable behavior the worker
//! platform depends on: sweep delivery, cancellation, and
//! wait-for-all completion semantics.

use async_runtime::{Completion, CompletionState, EventLoop, TimerQueue};
use core_types::WorkerError;
use std::cell::Cell;
use std::rc::Rc;

mod timer_contract {
    use super::*;

    #[test]
    fn one_shot_fires_exactly_once() {
        let queue = TimerQueue::new();
        let count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&count);
        queue.schedule(
            move || {
                counter.set(counter.get() + 1);
                Ok(())
            },
            100,
            false,
        );

        queue.advance(50);
        assert_eq!(count.get(), 0);
        queue.advance(150);
        assert_eq!(count.get(), 1);
        queue.advance(200);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn repeating_fires_once_per_due_tick() {
        let queue = TimerQueue::new();
        let count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&count);
        queue.schedule(
            move || {
                counter.set(counter.get() + 1);
                Ok(())
            },
            100,
            true,
        );

        for tick in [100, 200, 300] {
            queue.advance(tick);
        }
        assert_eq!(count.get(), 3);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn failed_callback_never_reruns() {
        let queue = TimerQueue::new();
        let attempts = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&attempts);
        queue.schedule(
            move || {
                counter.set(counter.get() + 1);
                Err(WorkerError::DeferredWork("always".to_string()))
            },
            100,
            false,
        );

        queue.advance(100);
        queue.advance(200);
        assert_eq!(attempts.get(), 1);
    }
}

mod event_loop_contract {
    use super::*;

    #[test]
    fn tick_reports_fired_count() {
        let event_loop = EventLoop::new();
        event_loop.set_timeout(|| Ok(()), 10);
        event_loop.set_timeout(|| Ok(()), 20);
        assert_eq!(event_loop.tick(5), 0);
        assert_eq!(event_loop.tick(25), 2);
    }
}

mod completion_contract {
    use super::*;

    #[test]
    fn settle_is_observed_exactly_once() {
        let completion: Completion<()> = Completion::new();
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        completion.on_settle(move |_| counter.set(counter.get() + 1));

        completion.resolve(());
        completion.resolve(());
        completion.reject(WorkerError::DeferredWork("late".to_string()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn all_waits_for_both_regardless_of_order() {
        for settle_first in [0, 1] {
            let children = [Completion::<()>::new(), Completion::<()>::new()];
            let joined = Completion::all(children.clone());

            children[settle_first].resolve(());
            assert_eq!(joined.state(), CompletionState::Pending);
            children[1 - settle_first].resolve(());
            assert_eq!(joined.state(), CompletionState::Fulfilled);
        }
    }
}

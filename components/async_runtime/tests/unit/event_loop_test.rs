//! Unit tests for EventLoop

use async_runtime::EventLoop;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn timeout_and_interval_share_one_clock() {
    let event_loop = EventLoop::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    event_loop.set_timeout(
        move || {
            log.borrow_mut().push("timeout");
            Ok(())
        },
        150,
    );
    let log = Rc::clone(&order);
    event_loop.set_interval(
        move || {
            log.borrow_mut().push("interval");
            Ok(())
        },
        100,
    );

    event_loop.tick(100);
    event_loop.tick(200);
    assert_eq!(*order.borrow(), vec!["interval", "timeout", "interval"]);
}

#[test]
fn handler_scheduled_work_survives_across_ticks() {
    let event_loop = EventLoop::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    let inner_loop = event_loop.clone();
    event_loop.set_timeout(
        move || {
            log.borrow_mut().push("first");
            let log = Rc::clone(&log);
            inner_loop.set_timeout(
                move || {
                    log.borrow_mut().push("second");
                    Ok(())
                },
                50,
            );
            Ok(())
        },
        50,
    );

    event_loop.tick(50);
    event_loop.tick(100);
    assert_eq!(*order.borrow(), vec!["first", "second"]);
}

#[test]
fn now_tracks_the_latest_tick() {
    let event_loop = EventLoop::new();
    assert_eq!(event_loop.now(), 0);
    event_loop.tick(500);
    assert_eq!(event_loop.now(), 500);
}

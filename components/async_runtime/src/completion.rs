//! Deferred-completion primitive.
//!
//! A [`Completion`] is a cloneable handle to shared settle-once state:
//! it starts pending, settles exactly once (first settle wins, later
//! settles are no-ops), and notifies continuations registered via
//! [`Completion::on_settle`] at settle time, never by polling. There is
//! no cancellation.

use core_types::WorkerError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// The state of a [`Completion`].
///
/// Once settled (Fulfilled or Rejected), a completion cannot change
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

type Reaction<T> = Box<dyn FnOnce(Result<&T, &WorkerError>)>;

struct Inner<T> {
    state: CompletionState,
    value: Option<Rc<T>>,
    error: Option<WorkerError>,
    reactions: Vec<Reaction<T>>,
}

/// A deferred completion event handlers and the host can settle later.
///
/// # Examples
///
/// ```
/// use async_runtime::{Completion, CompletionState};
///
/// let completion: Completion<u32> = Completion::new();
/// assert_eq!(completion.state(), CompletionState::Pending);
///
/// completion.resolve(7);
/// assert_eq!(completion.state(), CompletionState::Fulfilled);
/// assert_eq!(completion.value(), Some(7));
/// ```
pub struct Completion<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Completion<T> {
    /// Creates a pending completion.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: CompletionState::Pending,
                value: None,
                error: None,
                reactions: Vec::new(),
            })),
        }
    }

    /// Creates an already-fulfilled completion.
    pub fn fulfilled(value: T) -> Self {
        let completion = Self::new();
        completion.resolve(value);
        completion
    }

    /// Creates an already-rejected completion.
    pub fn rejected(error: WorkerError) -> Self {
        let completion = Self::new();
        completion.reject(error);
        completion
    }

    /// Returns the current state.
    pub fn state(&self) -> CompletionState {
        self.inner.borrow().state
    }

    /// Returns true once the completion is fulfilled or rejected.
    pub fn is_settled(&self) -> bool {
        self.state() != CompletionState::Pending
    }

    /// Fulfills the completion. No-op if already settled.
    pub fn resolve(&self, value: T) {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != CompletionState::Pending {
                return;
            }
            inner.state = CompletionState::Fulfilled;
            inner.value = Some(Rc::new(value));
            std::mem::take(&mut inner.reactions)
        };
        // The borrow is released before continuations run, so a
        // continuation may freely inspect or clone this completion.
        let value = self
            .inner
            .borrow()
            .value
            .clone()
            .expect("fulfilled completion holds a value");
        for reaction in reactions {
            reaction(Ok(value.as_ref()));
        }
    }

    /// Rejects the completion. No-op if already settled.
    pub fn reject(&self, error: WorkerError) {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != CompletionState::Pending {
                return;
            }
            inner.state = CompletionState::Rejected;
            inner.error = Some(error);
            std::mem::take(&mut inner.reactions)
        };
        let error = self
            .inner
            .borrow()
            .error
            .clone()
            .expect("rejected completion holds an error");
        for reaction in reactions {
            reaction(Err(&error));
        }
    }

    /// Registers a continuation invoked exactly once when the completion
    /// settles. If it already settled, the continuation runs immediately.
    pub fn on_settle<F>(&self, f: F)
    where
        F: FnOnce(Result<&T, &WorkerError>) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            CompletionState::Pending => {
                inner.reactions.push(Box::new(f));
            }
            CompletionState::Fulfilled => {
                let value = inner
                    .value
                    .clone()
                    .expect("fulfilled completion holds a value");
                drop(inner);
                f(Ok(value.as_ref()));
            }
            CompletionState::Rejected => {
                let error = inner
                    .error
                    .clone()
                    .expect("rejected completion holds an error");
                drop(inner);
                f(Err(&error));
            }
        }
    }

    /// Returns the recorded error of a rejected completion.
    pub fn error(&self) -> Option<WorkerError> {
        self.inner.borrow().error.clone()
    }
}

impl<T: Clone> Completion<T> {
    /// Returns a clone of the fulfilled value, if any.
    pub fn value(&self) -> Option<T> {
        self.inner
            .borrow()
            .value
            .as_ref()
            .map(|value| T::clone(value))
    }
}

impl Completion<()> {
    /// Waits for every child to settle.
    ///
    /// The result fulfills once all children have settled and none
    /// failed; otherwise it rejects with the first failure observed,
    /// but only after every child has settled; a failing child does
    /// not stop the others from running to completion. An empty set
    /// fulfills immediately.
    pub fn all<I>(children: I) -> Completion<()>
    where
        I: IntoIterator<Item = Completion<()>>,
    {
        let children: Vec<Completion<()>> = children.into_iter().collect();
        let joined = Completion::new();
        if children.is_empty() {
            joined.resolve(());
            return joined;
        }

        let remaining = Rc::new(Cell::new(children.len()));
        let first_error: Rc<RefCell<Option<WorkerError>>> = Rc::new(RefCell::new(None));
        for child in &children {
            let joined = joined.clone();
            let remaining = Rc::clone(&remaining);
            let first_error = Rc::clone(&first_error);
            child.on_settle(move |result| {
                if let Err(error) = result {
                    let mut slot = first_error.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(error.clone());
                    }
                }
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    match first_error.borrow_mut().take() {
                        Some(error) => joined.reject(error),
                        None => joined.resolve(()),
                    }
                }
            });
        }
        joined
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("state", &self.state())
            .finish()
    }
}

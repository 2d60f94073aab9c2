//! Clients known to the worker.
//!
//! The registry is process-wide, append-only state: clients accumulate
//! over the worker's lifetime and are never removed. Fetch events refer
//! to clients by index into this registry.

use std::cell::RefCell;
use std::rc::Rc;

/// A window or page the worker may message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    url: String,
}

impl Client {
    /// The client's URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The append-only client registry.
///
/// # Examples
///
/// ```
/// use worker_platform::Clients;
///
/// let clients = Clients::new();
/// let index = clients.create("https://example.com/index.html");
/// assert_eq!(clients.get(index).unwrap().url(), "https://example.com/index.html");
/// ```
#[derive(Clone, Default)]
pub struct Clients {
    list: Rc<RefCell<Vec<Rc<Client>>>>,
}

impl Clients {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new client and returns its index.
    pub fn create(&self, url: impl Into<String>) -> usize {
        let mut list = self.list.borrow_mut();
        list.push(Rc::new(Client { url: url.into() }));
        list.len() - 1
    }

    /// Looks up a client by index.
    pub fn get(&self, index: usize) -> Option<Rc<Client>> {
        self.list.borrow().get(index).cloned()
    }

    /// Snapshots every client created so far, in creation order.
    pub fn get_all(&self) -> Vec<Rc<Client>> {
        self.list.borrow().clone()
    }

    /// The number of clients created so far.
    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    /// True while no client has been created.
    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }
}

impl std::fmt::Debug for Clients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clients")
            .field("count", &self.len())
            .finish()
    }
}

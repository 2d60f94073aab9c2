//! Cache facade delegating persistence to the host.
//!
//! The core owns only the list of cache names; every entry operation is
//! forwarded through [`CacheHost`] and completes asynchronously. Stored
//! responses travel transport-encoded and are decoded before handler
//! code sees them.

use crate::bridge::CacheHost;
use async_runtime::Completion;
use core_types::{Request, Response};
use std::cell::RefCell;
use std::rc::Rc;

/// A single named cache.
#[derive(Clone)]
pub struct Cache {
    name: String,
    host: Rc<dyn CacheHost>,
}

impl Cache {
    /// The cache's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up the response stored for `request`.
    pub fn match_entry(&self, request: &Request) -> Completion<Option<Response>> {
        let matched = Completion::new();
        let resolved = matched.clone();
        self.host
            .match_entry(&self.name, request)
            .on_settle(move |result| match result {
                Ok(Some(encoded)) => match encoded.decode() {
                    Ok(response) => resolved.resolve(Some(response)),
                    Err(error) => resolved.reject(error),
                },
                Ok(None) => resolved.resolve(None),
                Err(error) => resolved.reject(error.clone()),
            });
        matched
    }

    /// Looks up every stored response matching `request`, or all entries
    /// when no request is given.
    pub fn match_all(&self, request: Option<&Request>) -> Completion<Vec<Response>> {
        let matched = Completion::new();
        let resolved = matched.clone();
        self.host
            .match_all(&self.name, request)
            .on_settle(move |result| match result {
                Ok(encoded) => {
                    let mut responses = Vec::with_capacity(encoded.len());
                    for entry in encoded {
                        match entry.decode() {
                            Ok(response) => responses.push(response),
                            Err(error) => {
                                resolved.reject(error);
                                return;
                            }
                        }
                    }
                    resolved.resolve(responses);
                }
                Err(error) => resolved.reject(error.clone()),
            });
        matched
    }

    /// Fetches `request` host-side and stores the result.
    pub fn add(&self, request: &Request) -> Completion<()> {
        self.host.add(&self.name, request)
    }

    /// Adds every request in order, completing when all have stored.
    pub fn add_all(&self, requests: &[Request]) -> Completion<()> {
        Completion::all(requests.iter().map(|request| self.add(request)))
    }

    /// Stores `response` for `request`.
    pub fn put(&self, request: &Request, response: &Response) -> Completion<()> {
        self.host.put(&self.name, request, &response.encode())
    }

    /// Removes the entry stored for `request`. Resolves false if absent.
    pub fn delete(&self, request: &Request) -> Completion<bool> {
        self.host.delete_entry(&self.name, request)
    }

    /// Lists the request keys stored in this cache.
    pub fn keys(&self) -> Completion<Vec<String>> {
        self.host.keys(&self.name)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("name", &self.name).finish()
    }
}

struct StorageInner {
    host: Rc<dyn CacheHost>,
    names: RefCell<Vec<String>>,
}

/// The `caches` global: named caches by host-side storage.
#[derive(Clone)]
pub struct CacheStorage {
    inner: Rc<StorageInner>,
}

impl CacheStorage {
    /// Creates a storage facade over the given host.
    pub fn new(host: Rc<dyn CacheHost>) -> Self {
        Self {
            inner: Rc::new(StorageInner {
                host,
                names: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Opens (creating if needed) the named cache.
    pub fn open(&self, cache_name: &str) -> Completion<Cache> {
        {
            let mut names = self.inner.names.borrow_mut();
            if !names.iter().any(|name| name == cache_name) {
                names.push(cache_name.to_string());
            }
        }
        let opened = Completion::new();
        let resolved = opened.clone();
        let cache = Cache {
            name: cache_name.to_string(),
            host: Rc::clone(&self.inner.host),
        };
        self.inner
            .host
            .open(cache_name)
            .on_settle(move |result| match result {
                Ok(_) => resolved.resolve(cache.clone()),
                Err(error) => resolved.reject(error.clone()),
            });
        opened
    }

    /// True once the named cache has been opened here.
    pub fn has(&self, cache_name: &str) -> Completion<bool> {
        let known = self
            .inner
            .names
            .borrow()
            .iter()
            .any(|name| name == cache_name);
        Completion::fulfilled(known)
    }

    /// Deletes the named cache. Resolves false if it was never opened.
    pub fn delete(&self, cache_name: &str) -> Completion<bool> {
        let existed = {
            let mut names = self.inner.names.borrow_mut();
            match names.iter().position(|name| name == cache_name) {
                Some(index) => {
                    names.remove(index);
                    true
                }
                None => false,
            }
        };
        if !existed {
            return Completion::fulfilled(false);
        }
        let deleted = Completion::new();
        let resolved = deleted.clone();
        self.inner
            .host
            .delete(cache_name)
            .on_settle(move |result| match result {
                Ok(_) => resolved.resolve(true),
                Err(error) => resolved.reject(error.clone()),
            });
        deleted
    }

    /// Lists the cache names opened so far.
    pub fn keys(&self) -> Completion<Vec<String>> {
        Completion::fulfilled(self.inner.names.borrow().clone())
    }

    /// Looks up `request` in one named cache.
    pub fn match_in(&self, cache_name: &str, request: &Request) -> Completion<Option<Response>> {
        let cache = Cache {
            name: cache_name.to_string(),
            host: Rc::clone(&self.inner.host),
        };
        cache.match_entry(request)
    }
}

impl std::fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStorage")
            .field("names", &self.inner.names.borrow().len())
            .finish()
    }
}

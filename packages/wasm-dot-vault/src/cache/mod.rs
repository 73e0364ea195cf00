//! Keyed async memoization with expiry
//!
//! Each entry holds either a resolved value with its expiry or the in-flight
//! fetch shared by every caller that asked for the same key meanwhile.
//! Failed fetches leave no entry behind.

pub mod chain;

pub use chain::{ChainMetadataCache, RegistryRequest};

use crate::error::VaultResult;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Millisecond wall clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Host clock (`Date.now()` in the browser)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Caches that can be invalidated by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheName {
    Metadata,
    RuntimeVersion,
    GenesisHash,
    BlockInfo,
    Registry,
    MinAmount,
    Connection,
    Balance,
}

type SharedFetch<V> = Shared<LocalBoxFuture<'static, VaultResult<V>>>;

enum Slot<V> {
    Ready { value: V, expires_at_ms: u64 },
    InFlight(SharedFetch<V>),
}

pub struct AsyncCache<V: Clone + 'static> {
    name: &'static str,
    ttl: Duration,
    clock: Rc<dyn Clock>,
    entries: RefCell<HashMap<String, Slot<V>>>,
}

impl<V: Clone + 'static> AsyncCache<V> {
    pub fn new(name: &'static str, ttl: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, joining or starting a fetch otherwise
    ///
    /// `fetch` is only invoked on a miss; it must not touch this cache
    /// before its future is first polled.
    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> VaultResult<V>
    where
        F: FnOnce() -> LocalBoxFuture<'static, VaultResult<V>>,
    {
        let now = self.clock.now_ms();
        let pending = {
            let mut entries = self.entries.borrow_mut();
            match entries.get(key) {
                Some(Slot::Ready {
                    value,
                    expires_at_ms,
                }) if *expires_at_ms > now => return Ok(value.clone()),
                Some(Slot::InFlight(shared)) => {
                    tracing::debug!(cache = self.name, key, "Joining in-flight fetch");
                    shared.clone()
                }
                _ => {
                    tracing::debug!(cache = self.name, key, "Cache miss");
                    let shared = fetch().shared();
                    entries.insert(key.to_string(), Slot::InFlight(shared.clone()));
                    shared
                }
            }
        };

        let result = pending.clone().await;
        self.settle(key, &pending, &result);
        result
    }

    // First waiter to finish settles the slot; later ones find it already replaced
    fn settle(&self, key: &str, pending: &SharedFetch<V>, result: &VaultResult<V>) {
        let mut entries = self.entries.borrow_mut();
        let owns_slot = matches!(
            entries.get(key),
            Some(Slot::InFlight(shared)) if shared.ptr_eq(pending)
        );
        if !owns_slot {
            return;
        }
        match result {
            Ok(value) => {
                let expires_at_ms = self.clock.now_ms().saturating_add(self.ttl.as_millis() as u64);
                entries.insert(
                    key.to_string(),
                    Slot::Ready {
                        value: value.clone(),
                        expires_at_ms,
                    },
                );
            }
            Err(err) => {
                tracing::debug!(cache = self.name, key, error = %err, "Fetch failed, not cached");
                entries.remove(key);
            }
        }
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of live or in-flight entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Store implementation
//!
//! HashMap + insertion-order queue behind a parking_lot RwLock.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{CacheError, Result};

/// Byte-bounded key-value store with FIFO eviction
pub struct Store {
    /// Upper bound on the sum of all value lengths
    capacity: usize,

    inner: RwLock<Inner>,
}

/// State guarded by the store lock
#[derive(Default)]
struct Inner {
    entries: HashMap<String, Bytes>,

    /// Keys in first-insertion order, oldest at the front
    order: VecDeque<String>,

    /// Sum of `entries` value lengths
    occupied: usize,
}

impl Store {
    /// Create an empty store holding at most `capacity` bytes of values
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Insert or replace a value (write lock)
    ///
    /// Evicts the oldest-inserted entries, never `key` itself, until the new
    /// value fits. Returns how many entries were evicted.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<usize> {
        let key = key.into();
        let value = value.into();

        if value.len() > self.capacity {
            return Err(CacheError::ValueTooLarge {
                size: value.len(),
                capacity: self.capacity,
            });
        }

        let mut inner = self.inner.write();
        let current = inner.entries.get(&key).map_or(0, Bytes::len);
        let mut evicted = 0;

        while inner.occupied - current + value.len() > self.capacity {
            if !inner.evict_oldest_except(&key) {
                break;
            }
            evicted += 1;
        }

        let new_len = value.len();
        match inner.entries.insert(key.clone(), value) {
            Some(old) => inner.occupied -= old.len(),
            None => inner.order.push_back(key),
        }
        inner.occupied += new_len;

        Ok(evicted)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    /// Total bytes of stored values
    pub fn occupied_bytes(&self) -> usize {
        self.inner.read().occupied
    }

    /// Configured byte budget
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Snapshot of stored keys, next eviction candidate first
    pub fn keys_in_eviction_order(&self) -> Vec<String> {
        self.inner.read().order.iter().cloned().collect()
    }
}

impl Inner {
    /// Remove the oldest entry whose key is not `keep`
    ///
    /// Returns false when nothing but `keep` is left.
    fn evict_oldest_except(&mut self, keep: &str) -> bool {
        let Some(pos) = self.order.iter().position(|k| k != keep) else {
            return false;
        };
        let Some(victim) = self.order.remove(pos) else {
            return false;
        };
        if let Some(value) = self.entries.remove(&victim) {
            self.occupied -= value.len();
            tracing::debug!("Evicted {} ({} bytes)", victim, value.len());
        }
        true
    }
}

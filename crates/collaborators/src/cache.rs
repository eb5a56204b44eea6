//! TTL cache for collaborator pulls.
//!
//! Bounds call volume against slow or rate-limited upstreams: a fresh entry
//! is served from memory, a stale one is evicted on read.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A small string-keyed cache with per-cache TTL.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a fresh value, evicting it if expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, stamping it now.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.into(), (Instant::now(), value.into()));
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }
}

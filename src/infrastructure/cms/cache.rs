use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;

/// Short-lived cache of successful CMS bodies keyed by full URL.
/// A zero TTL disables it.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, (Instant, Value)>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }

        let fresh = self
            .entries
            .get(key)
            .filter(|entry| entry.0.elapsed() < self.ttl)
            .map(|entry| entry.1.clone());

        if fresh.is_none() {
            self.entries.remove(key);
        }
        fresh
    }

    pub fn insert(&self, key: String, value: Value) {
        if self.is_enabled() {
            self.entries.insert(key, (Instant::now(), value));
        }
    }

    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

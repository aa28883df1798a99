use std::{
    collections::VecDeque,
    sync::Arc,
    time::Duration,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::redis_store::RedisWindowStore;

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds the caller should wait before retrying; 0 when allowed.
    pub retry_after: u64,
}

impl RateDecision {
    pub fn allow(remaining: u32) -> Self {
        Self { allowed: true, remaining, retry_after: 0 }
    }

    pub fn deny(retry_after: u64) -> Self {
        Self { allowed: false, remaining: 0, retry_after }
    }
}

/// Sliding log of accepted requests for one client.
///
/// Only accepted requests are recorded, so a client that keeps hammering
/// the endpoint while limited does not extend its own lockout.
#[derive(Debug)]
pub struct SlidingWindow {
    window_size: Duration,
    limit: u32,
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u32) -> Self {
        Self {
            window_size,
            limit,
            hits: VecDeque::with_capacity(limit as usize),
            last_seen: Instant::now(),
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= self.window_size {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn allow(&mut self) -> RateDecision {
        let now = Instant::now();
        self.last_seen = now;
        self.prune(now);

        let used = self.hits.len() as u32;
        if used < self.limit {
            self.hits.push_back(now);
            RateDecision::allow(self.limit - used - 1)
        } else {
            RateDecision::deny(self.window_size.as_secs().max(1))
        }
    }
}

type Key = String;

/// In-process window store. Check-and-record runs under the per-client
/// mutex, so concurrent workers never undercount.
#[derive(Clone)]
pub struct SlidingWindowStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u32,
}

impl SlidingWindowStore {
    pub fn new(limit: u32, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    fn get_window(&self, key: &str) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }

        let window = Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit)));
        match self.map.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(window.clone());
                window
            }
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        let window = self.get_window(key);
        let mut w = window.lock();
        w.allow()
    }

    /// Removes windows idle for longer than `ttl`; returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = self.map.len();
        self.map
            .retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_size(&self) -> Duration {
        self.window_size
    }
}

/// Rate limiter for one route. Uses Redis when configured so that every
/// worker process shares the same counters; falls back to the in-process
/// store when Redis is unavailable rather than letting requests through
/// uncounted.
#[derive(Clone)]
pub struct RateLimiter {
    scope: &'static str,
    local: SlidingWindowStore,
    redis: Option<RedisWindowStore>,
}

impl RateLimiter {
    pub fn new(scope: &'static str, local: SlidingWindowStore, redis: Option<RedisWindowStore>) -> Self {
        Self { scope, local, redis }
    }

    pub fn in_memory(scope: &'static str, limit: u32, window_size: Duration) -> Self {
        Self::new(scope, SlidingWindowStore::new(limit, window_size), None)
    }

    pub async fn check(&self, client_id: &str) -> RateDecision {
        let key = format!("rl:{}:{}", self.scope, urlencoding::encode(client_id));

        if let Some(redis) = &self.redis {
            match redis.check(&key).await {
                Ok(decision) => return decision,
                Err(e) => {
                    tracing::warn!(scope = self.scope, "Redis rate limiter unavailable, using local window: {}", e);
                }
            }
        }

        self.local.check(&key)
    }

    pub fn local_store(&self) -> &SlidingWindowStore {
        &self.local
    }

    pub fn backend(&self) -> &'static str {
        if self.redis.is_some() { "redis" } else { "memory" }
    }

    pub async fn store_status(&self) -> &'static str {
        match &self.redis {
            Some(redis) => match redis.ping().await {
                Ok(()) => "OK",
                Err(_) => "Unavailable (using local window)",
            },
            None => "In-memory",
        }
    }
}

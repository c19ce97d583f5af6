//! Sliding-window rate limiting over a swappable counter store.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

/// Storage for per-key hit timestamps.
///
/// The in-memory store is process local; a shared cache can implement this
/// trait when several instances must agree on the counts.
pub trait CounterStore: Send + Sync {
    /// Hits recorded for `key` within `window` before `now`.
    fn hits(&self, key: &str, now: Instant, window: Duration) -> u32;
    /// Record `count` hits at `now` and return the total within `window`.
    fn record(&self, key: &str, count: u32, now: Instant, window: Duration) -> u32;
    /// Forget keys without hits inside `window`.
    fn purge(&self, now: Instant, window: Duration);
}

#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, VecDeque<Instant>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.saturating_duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

impl CounterStore for InMemoryCounterStore {
    fn hits(&self, key: &str, now: Instant, window: Duration) -> u32 {
        match self.entries.get_mut(key) {
            Some(mut timestamps) => {
                prune(&mut timestamps, now, window);
                timestamps.len() as u32
            }
            None => 0,
        }
    }

    fn record(&self, key: &str, count: u32, now: Instant, window: Duration) -> u32 {
        let mut timestamps = self.entries.entry(key.to_string()).or_default();
        prune(&mut timestamps, now, window);
        timestamps.extend(std::iter::repeat_n(now, count as usize));
        timestamps.len() as u32
    }

    fn purge(&self, now: Instant, window: Duration) {
        self.entries.retain(|_, timestamps| {
            prune(timestamps, now, window);
            !timestamps.is_empty()
        });
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rate limit of {limit} per {window_secs}s exceeded")]
pub struct RateLimitExceeded {
    pub limit: u32,
    pub window_secs: u64,
}

/// Caps the number of events a client may produce within a rolling window.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    scope: &'static str,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        scope: &'static str,
        limit: u32,
        window: Duration,
    ) -> Self {
        Self {
            store,
            scope,
            limit,
            window,
        }
    }

    /// Upload limiter: `limit` files per client per rolling hour.
    pub fn uploads(store: Arc<dyn CounterStore>, limit: u32) -> Self {
        Self::new(store, "uploads", limit, Duration::from_secs(60 * 60))
    }

    /// Admit `count` events for `client` at `now`, recording them when allowed.
    pub fn check_at(
        &self,
        client: &str,
        count: u32,
        now: Instant,
    ) -> Result<(), RateLimitExceeded> {
        let key = format!("{}:{client}", self.scope);

        if self.store.hits(&key, now, self.window).saturating_add(count) > self.limit {
            log::warn!("Rate limit hit for {key} ({} per {:?})", self.limit, self.window);
            return Err(RateLimitExceeded {
                limit: self.limit,
                window_secs: self.window.as_secs(),
            });
        }

        self.store.record(&key, count, now, self.window);
        Ok(())
    }

    pub fn check(&self, client: &str, count: u32) -> Result<(), RateLimitExceeded> {
        self.check_at(client, count, Instant::now())
    }

    /// Drop expired counters; called periodically by the server.
    pub fn purge(&self) {
        self.store.purge(Instant::now(), self.window);
    }
}

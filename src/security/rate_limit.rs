//! Fixed-window rate limiting keyed by client.
//!
//! Each key gets a counter and a reset instant. The counter is replaced
//! wholesale once the reset instant has passed, so a client can land up to
//! `2 * max - 1` requests around a window boundary. The reaper evicts expired
//! counters on a timer so the map stays bounded under many one-off keys.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::client_key::ClientKey;

/// Admission store consulted by the submission pipeline.
///
/// Implementations must make `admit` a single atomic read-modify-write per key
/// and must not block admission while sweeping.
pub trait RateLimitStore: Send + Sync {
    /// Returns true and consumes one slot if the key is under its quota.
    fn admit(&self, key: &ClientKey) -> bool;

    /// Evicts expired state, returning how many keys were removed.
    fn sweep(&self) -> usize;

    /// Number of keys currently held.
    fn tracked_keys(&self) -> usize;
}

/// Window length and quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl From<&RateLimitConfig> for WindowPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            window: config.window(),
            max_requests: config.max_requests,
        }
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

/// Per-key counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateLimitEntry {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// In-memory fixed-window limiter.
///
/// DashMap's entry API holds the shard lock for the whole check-and-increment,
/// and `retain` takes the same shard locks when sweeping.
pub struct FixedWindowLimiter {
    entries: DashMap<ClientKey, RateLimitEntry>,
    policy: ArcSwap<WindowPolicy>,
}

impl FixedWindowLimiter {
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy: ArcSwap::from_pointee(policy),
        }
    }

    pub fn policy(&self) -> WindowPolicy {
        **self.policy.load()
    }

    /// Replace the policy for subsequent decisions.
    ///
    /// Open windows keep their reset instant; a lower quota applies at once.
    pub fn set_policy(&self, policy: WindowPolicy) {
        let previous = self.policy.swap(Arc::new(policy));
        if *previous != policy {
            tracing::info!(
                window_secs = policy.window.as_secs(),
                max_requests = policy.max_requests,
                "Rate limit policy updated"
            );
        }
    }

    pub fn admit_at(&self, key: &ClientKey, now: Instant) -> bool {
        let policy = self.policy.load();
        match self.entries.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(RateLimitEntry::open(now, policy.window));
                true
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.is_expired(now) {
                    *entry = RateLimitEntry::open(now, policy.window);
                    true
                } else if entry.count < policy.max_requests {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Snapshot of one key's counter.
    pub fn entry(&self, key: &ClientKey) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|r| *r.value())
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(WindowPolicy::default())
    }
}

impl RateLimitStore for FixedWindowLimiter {
    fn admit(&self, key: &ClientKey) -> bool {
        self.admit_at(key, Instant::now())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

/// Periodic eviction of expired counters.
pub struct Reaper {
    store: Arc<dyn RateLimitStore>,
    interval: Duration,
}

impl Reaper {
    pub fn new(store: Arc<dyn RateLimitStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Rate limit reaper starting");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.store.sweep();
                    let remaining = self.store.tracked_keys();
                    metrics::record_sweep(removed, remaining);
                    tracing::debug!(removed, remaining, "Rate limit sweep finished");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit reaper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

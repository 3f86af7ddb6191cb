// LeadScout Engine — Quota Governor
// Per-caller hourly + daily request counters and the 24-hour pause flag
// (circuit breaker) behind one expiring key-value seam.
//
// Counting is "fail expensive": both windows are incremented first and the
// ceiling check runs on the new values, so the rejecting attempt still
// counts against quota. Window boundaries are wall-clock UTC bucket keys,
// not sliding windows — a caller can burst up to 2× a ceiling across a
// boundary edge; accepted approximation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::Mutex;

use crate::atoms::constants::{DAY_BUCKET_TTL_SECS, HOUR_BUCKET_TTL_SECS};
use crate::atoms::error::QuotaWindow;
use crate::engine::config::CoreConfig;

/// Clock source, injectable for TTL simulation in tests.
pub type ClockFn = dyn Fn() -> DateTime<Utc> + Send + Sync;

// ── Expiring key-value seam ────────────────────────────────────────────────

/// Atomic counters and TTL flags for quota/pause state.
/// Deployments sharing state across instances inject an implementation
/// backed by a shared expiring store; the in-process `MemoryCapStore`
/// fallback is correct only for a single-instance deployment.
pub trait CapStore: Send + Sync {
    /// Atomically increment `key`, creating it with `ttl` if absent or
    /// expired. Returns the new count. The TTL is set only on creation —
    /// later increments within the window do not extend it.
    fn incr(&self, key: &str, ttl: Duration) -> u64;

    /// Set a flag with `ttl`, unconditionally overwriting any shorter
    /// remaining TTL.
    fn set_flag(&self, key: &str, ttl: Duration);

    /// True iff a live (non-expired) entry exists for `key`.
    fn flag_live(&self, key: &str) -> bool;
}

// ── In-process fallback backend ────────────────────────────────────────────

struct Entry {
    count: u64,
    expires_at: DateTime<Utc>,
}

/// Mutexed-map backend with lazy expiry. Process-lifetime only, not shared
/// across instances — the caller is warned at construction.
pub struct MemoryCapStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<ClockFn>,
}

impl MemoryCapStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Test hook: drive expiry from a simulated clock.
    pub fn with_clock(clock: Arc<ClockFn>) -> Self {
        MemoryCapStore { entries: Mutex::new(HashMap::new()), clock }
    }

    fn expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        entry.expires_at <= now
    }
}

impl Default for MemoryCapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CapStore for MemoryCapStore {
    fn incr(&self, key: &str, ttl: Duration) -> u64 {
        let now = (self.clock)();
        let mut entries = self.entries.lock();
        match entries.get_mut(key) {
            Some(entry) if !self.expired(entry, now) => {
                entry.count += 1;
                entry.count
            }
            _ => {
                let expires_at = now + ttl_delta(ttl);
                entries.insert(key.to_string(), Entry { count: 1, expires_at });
                1
            }
        }
    }

    fn set_flag(&self, key: &str, ttl: Duration) {
        let now = (self.clock)();
        let expires_at = now + ttl_delta(ttl);
        self.entries
            .lock()
            .insert(key.to_string(), Entry { count: 1, expires_at });
    }

    fn flag_live(&self, key: &str) -> bool {
        let now = (self.clock)();
        self.entries
            .lock()
            .get(key)
            .map(|e| !self.expired(e, now))
            .unwrap_or(false)
    }
}

// ── Governor ───────────────────────────────────────────────────────────────

pub struct QuotaGovernor {
    store: Arc<dyn CapStore>,
    hourly_cap: u64,
    daily_cap: u64,
    pause_ttl: Duration,
    clock: Arc<ClockFn>,
}

impl QuotaGovernor {
    /// Governor over the in-process fallback store. Logs the degraded-mode
    /// notice: counters are not shared across instances.
    pub fn new(config: &CoreConfig) -> Self {
        warn!("[quota] no shared cap store injected — using in-process counters (single-instance only)");
        Self::with_store(config, Arc::new(MemoryCapStore::new()))
    }

    /// Governor over an injected backend (shared store in production,
    /// clock-controlled fake in tests).
    pub fn with_store(config: &CoreConfig, store: Arc<dyn CapStore>) -> Self {
        QuotaGovernor {
            store,
            hourly_cap: config.hourly_cap,
            daily_cap: config.daily_cap,
            pause_ttl: Duration::from_secs(config.pause_ttl_secs),
            clock: Arc::new(Utc::now),
        }
    }

    /// Test hook: bucket keys follow the simulated clock.
    pub fn with_store_and_clock(
        config: &CoreConfig,
        store: Arc<dyn CapStore>,
        clock: Arc<ClockFn>,
    ) -> Self {
        QuotaGovernor { clock, ..Self::with_store(config, store) }
    }

    /// Count this attempt against both windows, then enforce the ceilings.
    /// Rejection happens after incrementing — the attempt stays counted.
    pub fn check_and_consume(&self, caller: i64) -> Result<(), QuotaWindow> {
        let now = (self.clock)();
        let hour_key = format!("cap:{}:{}", caller, now.format("%Y%m%d%H"));
        let day_key = format!("cap:{}:{}", caller, now.format("%Y%m%d"));

        let hour_count = self
            .store
            .incr(&hour_key, Duration::from_secs(HOUR_BUCKET_TTL_SECS));
        let day_count = self
            .store
            .incr(&day_key, Duration::from_secs(DAY_BUCKET_TTL_SECS));

        if hour_count > self.hourly_cap {
            warn!(
                "[quota] caller {} exceeded hourly cap ({} > {})",
                caller, hour_count, self.hourly_cap
            );
            return Err(QuotaWindow::Hourly);
        }
        if day_count > self.daily_cap {
            warn!(
                "[quota] caller {} exceeded daily cap ({} > {})",
                caller, day_count, self.daily_cap
            );
            return Err(QuotaWindow::Daily);
        }
        Ok(())
    }

    /// Trip the circuit breaker: pause all protected operations for this
    /// caller for the full configured TTL, overwriting any shorter one.
    pub fn pause(&self, caller: i64) {
        warn!(
            "[quota] pausing caller {} for {}s after upstream challenge",
            caller,
            self.pause_ttl.as_secs()
        );
        self.store.set_flag(&pause_key(caller), self.pause_ttl);
    }

    /// True iff a live pause flag exists for this caller.
    pub fn is_paused(&self, caller: i64) -> bool {
        let paused = self.store.flag_live(&pause_key(caller));
        if paused {
            info!("[quota] caller {} is paused — rejecting", caller);
        }
        paused
    }
}

fn pause_key(caller: i64) -> String {
    format!("pause:{}", caller)
}

fn ttl_delta(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero())
}

// ── Tests ──────────────────────────────────────────────────────────────────

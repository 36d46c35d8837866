//! # state
//!
//! Delivery counters shared between the notifier and the `/health` handler.
//!
//! These are observability only.  No cycle reads them to decide anything, so
//! overlapping cycles never coordinate through this struct; they just bump
//! independent atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ─── SchedulerState ───────────────────────────────────────────────────────────

/// Where the notifier stands between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulerState {
    /// Only the recurring tick is pending.
    Idle,
    /// At least one deferred rate-limit retry is scheduled or running.
    RetryPending,
}

// ─── NotifierStats ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct NotifierStats {
    /// Cycles started, ticks and retries alike.
    pub cycles:         AtomicU64,
    pub delivered:      AtomicU64,
    pub fetch_failures: AtomicU64,
    pub send_failures:  AtomicU64,
    /// Sends refused with a retry-after.  Each one scheduled one retry.
    pub rate_limited:   AtomicU64,
    /// Deferred cycles scheduled but not yet finished.
    pub retries_pending: AtomicU64,
    last_delivered_at:  RwLock<Option<DateTime<Utc>>>,
}

/// Point-in-time copy for serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub cycles:            u64,
    pub delivered:         u64,
    pub fetch_failures:    u64,
    pub send_failures:     u64,
    pub rate_limited:      u64,
    pub retries_pending:   u64,
    pub last_delivered_at: Option<DateTime<Utc>>,
}

impl NotifierStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delivery(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_delivered_at.write() {
            *last = Some(Utc::now());
        }
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        if self.retries_pending.load(Ordering::Acquire) > 0 {
            SchedulerState::RetryPending
        } else {
            SchedulerState::Idle
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles:            self.cycles.load(Ordering::Relaxed),
            delivered:         self.delivered.load(Ordering::Relaxed),
            fetch_failures:    self.fetch_failures.load(Ordering::Relaxed),
            send_failures:     self.send_failures.load(Ordering::Relaxed),
            rate_limited:      self.rate_limited.load(Ordering::Relaxed),
            retries_pending:   self.retries_pending.load(Ordering::Relaxed),
            last_delivered_at: self.last_delivered_at.read().ok().and_then(|t| *t),
        }
    }
}

/// Convenience alias, mirrors how the handler receives it.
pub type SharedStats = Arc<NotifierStats>;

//! # notifier — the fetch → format → send cycle and its scheduling
//!
//! ```text
//! every interval (first tick one interval after start):
//!   spawn cycle ─┬─ 1. GET price            ── fail ─▶ log, wait for next tick
//!                ├─ 2. GET 24h stats        ── fail ─▶ log, wait for next tick
//!                ├─ 3. build message
//!                └─ 4. sendMessage ─┬─ ok ──────────────▶ done
//!                                   ├─ 429 retry_after ─▶ one full cycle after the delay
//!                                   └─ other ───────────▶ log, no retry
//! ```
//!
//! Ticks never wait for each other: a slow cycle can overlap the next one.
//! Cycles share no mutable state apart from the delivery counters.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::FetchError;
use crate::format::build_message;
use crate::market::MarketSource;
use crate::models::{DailyStats, PriceQuote};
use crate::state::{NotifierStats, SchedulerState, SharedStats};
use crate::telegram::{MessageSink, ParseMode};

// ─── Types ────────────────────────────────────────────────────────────────────

/// What the notifier needs from [`Config`].
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub symbol:     String,
    pub pair_label: String,
    pub chat_id:    String,
    pub interval:   Duration,
}

impl From<&Config> for NotifierSettings {
    fn from(config: &Config) -> Self {
        Self {
            symbol:     config.symbol.clone(),
            pair_label: config.pair_label.clone(),
            chat_id:    config.chat_id.clone(),
            interval:   config.notify_interval,
        }
    }
}

/// Why a cycle started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Tick,
    Retry,
}

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered,
    /// Price or stats could not be read; nothing was sent.
    FetchFailed,
    /// Delivery refused for a reason other than throttling.
    SendFailed,
    /// Delivery throttled; a deferred cycle was scheduled.
    RateLimited { retry_after: Duration },
}

/// A scheduled deferred cycle.  Dropping the handle leaves it scheduled.
#[derive(Debug)]
pub struct RetryHandle {
    delay: Duration,
    task:  JoinHandle<Option<CycleOutcome>>,
}

impl RetryHandle {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Aborts the retry if it has not finished yet, including a cycle that
    /// is midway through its fetch or send.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Waits for the deferred cycle. `None` if it was cancelled.
    pub async fn join(self) -> Option<CycleOutcome> {
        self.task.await.ok().flatten()
    }
}

/// Keeps `retries_pending` raised while a deferred cycle is scheduled or
/// running, including when the task is aborted.
struct PendingRetry(SharedStats);

impl PendingRetry {
    fn new(stats: SharedStats) -> Self {
        stats.retries_pending.fetch_add(1, Ordering::AcqRel);
        Self(stats)
    }
}

impl Drop for PendingRetry {
    fn drop(&mut self) {
        self.0.retries_pending.fetch_sub(1, Ordering::AcqRel);
    }
}

// ─── Notifier ─────────────────────────────────────────────────────────────────

/// Everything a cycle needs, built once at startup and shared via `Arc`.
pub struct Notifier<M, S> {
    market:   M,
    sink:     S,
    settings: NotifierSettings,
    stats:    SharedStats,
}

impl<M: MarketSource, S: MessageSink> Notifier<M, S> {
    pub fn new(market: M, sink: S, settings: NotifierSettings, stats: SharedStats) -> Self {
        Self { market, sink, settings, stats }
    }

    pub fn stats(&self) -> &NotifierStats {
        &self.stats
    }

    pub fn state(&self) -> SchedulerState {
        self.stats.scheduler_state()
    }

    /// Recurring timer.  Never returns; each tick spawns its own cycle.
    pub async fn run(self: Arc<Self>) {
        let period = self.settings.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let _ = self.spawn_cycle(CycleKind::Tick);
        }
    }

    /// Runs one cycle in its own task and schedules the rate-limit retry.
    pub fn spawn_cycle(self: &Arc<Self>, kind: CycleKind) -> JoinHandle<CycleOutcome> {
        let this = Arc::clone(self);
        let span = info_span!("cycle", id = %Uuid::new_v4(), kind = ?kind);

        tokio::spawn(async move { this.cycle_and_reschedule().instrument(span).await })
    }

    /// Runs one full cycle after `delay`, inside the returned handle's task so
    /// that cancelling it also stops a cycle already in flight.
    pub fn schedule_retry(self: &Arc<Self>, delay: Duration) -> RetryHandle {
        let this = Arc::clone(self);
        let pending = PendingRetry::new(Arc::clone(&self.stats));

        let task = tokio::spawn(async move {
            let _pending = pending;
            tokio::time::sleep(delay).await;

            let span = info_span!("cycle", id = %Uuid::new_v4(), kind = ?CycleKind::Retry);
            Some(this.cycle_and_reschedule().instrument(span).await)
        });

        RetryHandle { delay, task }
    }

    async fn cycle_and_reschedule(self: &Arc<Self>) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        if let CycleOutcome::RateLimited { retry_after } = outcome {
            self.schedule_retry(retry_after);
        }
        outcome
    }

    /// One fetch → format → send pass.  Logs every failure, schedules nothing.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let (quote, daily) = match self.fetch_market().await {
            Ok(values) => values,
            Err(e) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, symbol = %self.settings.symbol, "❌ Error fetching market data");
                return CycleOutcome::FetchFailed;
            }
        };

        debug!(
            price  = quote.price,
            change = daily.price_change_percent,
            volume = daily.quote_volume,
            "Market data fetched"
        );

        let message = build_message(&self.settings.pair_label, &quote, &daily);

        match self
            .sink
            .send_message(&self.settings.chat_id, &message, ParseMode::Markdown)
            .await
        {
            Ok(()) => {
                self.stats.record_delivery();
                info!(chat_id = %self.settings.chat_id, "✅ Price update delivered");
                CycleOutcome::Delivered
            }
            Err(e) => match e.retry_after() {
                Some(retry_after) => {
                    self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        retry_after_secs = retry_after.as_secs(),
                        "⏳ Rate limit hit, retrying full cycle after delay"
                    );
                    CycleOutcome::RateLimited { retry_after }
                }
                None => {
                    self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "❌ Error sending message to Telegram");
                    CycleOutcome::SendFailed
                }
            },
        }
    }

    async fn fetch_market(&self) -> Result<(PriceQuote, DailyStats), FetchError> {
        let quote = self.market.fetch_price(&self.settings.symbol).await?;
        let daily = self.market.fetch_daily_stats(&self.settings.symbol).await?;
        Ok((quote, daily))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

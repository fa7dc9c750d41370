//! Tick sources for the countdown store.
//!
//! A [`Clock`] hands out [`TickSource`]s. Nothing happens until a source is
//! started; from then on it calls its handler once per interval until the
//! returned [`TickSubscription`] is cancelled or dropped.
//!
//! Three clocks are provided:
//!
//! - [`SystemClock`]: real wall-clock ticks on a tokio runtime.
//! - [`AcceleratedClock`]: ticks every few milliseconds, each one standing
//!   in for a full second. Used by async tests.
//! - [`ManualClock`]: no runtime at all, ticks are pushed by
//!   [`ManualClock::advance`].
//!
//! The store only counts ticks. The timestamp passed to the handler is
//! informational.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::lock;

/// Granularity the countdown store counts in.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default emission period of [`AcceleratedClock`].
pub const ACCELERATED_STEP: Duration = Duration::from_millis(10);

/// Callback invoked once per tick with the wall-clock time of emission.
pub type TickHandler = Box<dyn FnMut(DateTime<Utc>) + Send + 'static>;

/// Factory for recurring tick sources.
pub trait Clock: Send + Sync {
    /// Create a tick source for `interval`. No side effects until started.
    fn create_ticker(&self, interval: Duration) -> Box<dyn TickSource>;
}

/// A tick source that has not been started yet.
pub trait TickSource: Send {
    /// Begin emitting ticks into `on_tick`.
    fn start(self: Box<Self>, on_tick: TickHandler) -> TickSubscription;
}

/// Owned handle to a running tick source.
///
/// Cancelling is idempotent. Dropping the subscription cancels it.
#[derive(Debug)]
pub struct TickSubscription {
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl TickSubscription {
    fn new(cancelled: Arc<AtomicBool>, task: Option<AbortHandle>) -> Self {
        Self { cancelled, task }
    }

    /// Stop further emissions.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── Runtime-backed clocks ───────────────────────────────────────────

/// Ticker driven by `tokio::time::interval`. The first tick arrives one
/// period after start.
struct IntervalTicker {
    runtime: Handle,
    period: Duration,
}

impl TickSource for IntervalTicker {
    fn start(self: Box<Self>, mut on_tick: TickHandler) -> TickSubscription {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let period = self.period;
        let first = Instant::now() + period;

        let task = self.runtime.spawn(async move {
            let mut ticks = time::interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                on_tick(Utc::now());
            }
        });

        TickSubscription::new(cancelled, Some(task.abort_handle()))
    }
}

/// Production clock: one tick per real `interval`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    runtime: Handle,
}

impl SystemClock {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Bind to the runtime the caller is currently running on.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside of a tokio runtime.
    pub fn current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Clock for SystemClock {
    fn create_ticker(&self, interval: Duration) -> Box<dyn TickSource> {
        Box::new(IntervalTicker {
            runtime: self.runtime.clone(),
            period: interval,
        })
    }
}

/// Test clock that emits every `step` regardless of the requested interval.
///
/// Each emission still counts as one second for the store, so a
/// multi-minute countdown finishes in milliseconds.
#[derive(Debug, Clone)]
pub struct AcceleratedClock {
    runtime: Handle,
    step: Duration,
}

impl AcceleratedClock {
    pub fn new(runtime: Handle) -> Self {
        Self::with_step(runtime, ACCELERATED_STEP)
    }

    pub fn with_step(runtime: Handle, step: Duration) -> Self {
        Self { runtime, step }
    }

    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Clock for AcceleratedClock {
    /// # Panics
    ///
    /// Panics unless `interval` is [`TICK_INTERVAL`].
    fn create_ticker(&self, interval: Duration) -> Box<dyn TickSource> {
        assert_eq!(
            interval, TICK_INTERVAL,
            "accelerated clock only simulates one-second ticks"
        );
        Box::new(IntervalTicker {
            runtime: self.runtime.clone(),
            period: self.step,
        })
    }
}

// ── Manual clock ────────────────────────────────────────────────────

/// Handler slot. Empty while the handler is running.
type HandlerSlot = Arc<Mutex<Option<TickHandler>>>;

struct ManualSubscriber {
    cancelled: Arc<AtomicBool>,
    on_tick: HandlerSlot,
}

impl ManualSubscriber {
    fn is_live(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire)
    }
}

struct ManualState {
    now: DateTime<Utc>,
    subscribers: Vec<ManualSubscriber>,
    /// Cancelled subscribers, still reachable by `replay_late_ticks`.
    retired: Vec<ManualSubscriber>,
}

impl ManualState {
    fn retire_cancelled(&mut self) {
        let (live, cancelled): (Vec<_>, Vec<_>) = std::mem::take(&mut self.subscribers)
            .into_iter()
            .partition(ManualSubscriber::is_live);
        self.subscribers = live;
        self.retired.extend(cancelled);
    }
}

/// Run the handler in `slot` once.
///
/// The handler is taken out of its slot for the call, so one that advances
/// the clock again is skipped by the nested round instead of deadlocking.
fn deliver(slot: &Mutex<Option<TickHandler>>, now: DateTime<Utc>) {
    let Some(mut handler) = lock(slot).take() else {
        return;
    };
    handler(now);
    *lock(slot) = Some(handler);
}

/// Deterministic clock for synchronous tests.
///
/// Ticks are only delivered by [`advance`](Self::advance). Clones share the
/// same subscriber list.
#[derive(Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: Utc::now(),
                subscribers: Vec::new(),
                retired: Vec::new(),
            })),
        }
    }

    /// Deliver `ticks` ticks to every live subscription, one round at a time.
    ///
    /// Handlers run without the clock's lock held, so they may cancel or
    /// start subscriptions, or advance the clock themselves.
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            let (now, live) = {
                let mut state = lock(&self.state);
                state.now += chrono::Duration::seconds(1);
                state.retire_cancelled();
                let live: Vec<_> = state
                    .subscribers
                    .iter()
                    .map(|s| (Arc::clone(&s.cancelled), Arc::clone(&s.on_tick)))
                    .collect();
                (state.now, live)
            };

            for (cancelled, on_tick) in live {
                if cancelled.load(Ordering::Acquire) {
                    continue;
                }
                deliver(&on_tick, now);
            }
        }
    }

    /// Deliver `ticks` ticks to every subscription that was already cancelled.
    ///
    /// Mimics a host timer firing a callback that was queued before the
    /// cancellation landed. Simulated time does not move.
    pub fn replay_late_ticks(&self, ticks: u64) {
        for _ in 0..ticks {
            let (now, retired) = {
                let mut state = lock(&self.state);
                state.retire_cancelled();
                let retired: Vec<_> = state
                    .retired
                    .iter()
                    .map(|s| Arc::clone(&s.on_tick))
                    .collect();
                (state.now, retired)
            };

            for on_tick in retired {
                deliver(&on_tick, now);
            }
        }
    }

    /// Number of subscriptions that have been started and not cancelled.
    pub fn active_tickers(&self) -> usize {
        lock(&self.state)
            .subscribers
            .iter()
            .filter(|s| s.is_live())
            .count()
    }

    /// Simulated wall-clock time.
    pub fn now(&self) -> DateTime<Utc> {
        lock(&self.state).now
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now())
            .field("active_tickers", &self.active_tickers())
            .finish()
    }
}

struct ManualTicker {
    state: Arc<Mutex<ManualState>>,
}

impl TickSource for ManualTicker {
    fn start(self: Box<Self>, on_tick: TickHandler) -> TickSubscription {
        let cancelled = Arc::new(AtomicBool::new(false));
        lock(&self.state).subscribers.push(ManualSubscriber {
            cancelled: Arc::clone(&cancelled),
            on_tick: Arc::new(Mutex::new(Some(on_tick))),
        });
        TickSubscription::new(cancelled, None)
    }
}

impl Clock for ManualClock {
    /// # Panics
    ///
    /// Panics unless `interval` is [`TICK_INTERVAL`].
    fn create_ticker(&self, interval: Duration) -> Box<dyn TickSource> {
        assert_eq!(
            interval, TICK_INTERVAL,
            "manual clock only simulates one-second ticks"
        );
        Box::new(ManualTicker {
            state: Arc::clone(&self.state),
        })
    }
}

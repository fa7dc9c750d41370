//! Countdown store.
//!
//! A single-timer state machine driven by clock ticks. Commands validate
//! against the current state and either apply fully or return a
//! [`TimerError`] without touching anything.
//!
//! ## State Transitions
//!
//! ```text
//! Idle | Completed | Cancelled --start--> Running
//! Running <--toggle--> Paused
//! Running | Paused --cancel--> Cancelled
//! Running | Paused --restart--> Running
//! Running --depletion--> Completed
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let store = CountdownStore::new(Arc::new(SystemClock::current()?));
//! store.on_timer_completed(|| println!("done"));
//! store.start_new_timer(25, 0)?;
//! ```

use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::clock::{Clock, TickSubscription, TICK_INTERVAL};
use super::lock;
use crate::error::TimerError;
use crate::presets::PresetTimer;

const SECONDS_IN_MINUTE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// No timer has been created yet.
    Idle,
    /// Counting down.
    Running,
    /// Counting suspended, elapsed time frozen.
    Paused,
    /// Reached zero on its own.
    Completed,
    /// Aborted by the user.
    Cancelled,
}

impl TimerState {
    /// Whether a session is in progress (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }
}

/// Read-only view of the store at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub total_secs: u64,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    /// Duration the session was started with. `None` outside a session.
    pub initial_secs: Option<u64>,
    pub at: DateTime<Utc>,
}

type CompletionHandler = Arc<dyn Fn() + Send + Sync>;

struct Session {
    state: TimerState,
    total_secs: u64,
    initial_secs: u64,
    elapsed_secs: u64,
    /// Bumped on every subscribe so ticks from a superseded subscription
    /// can be told apart.
    generation: u64,
    ticks: Option<TickSubscription>,
}

impl Session {
    fn idle() -> Self {
        Self {
            state: TimerState::Idle,
            total_secs: 0,
            initial_secs: 0,
            elapsed_secs: 0,
            generation: 0,
            ticks: None,
        }
    }

    fn is_depleted(&self) -> bool {
        self.elapsed_secs >= self.total_secs
    }

    fn remaining_secs(&self) -> u64 {
        if !self.state.is_active() || self.is_depleted() {
            return 0;
        }
        self.total_secs - self.elapsed_secs
    }

    fn stop_ticks(&mut self) {
        if let Some(mut ticks) = self.ticks.take() {
            ticks.cancel();
        }
    }

    /// Clear the remaining time and drop the tick subscription.
    fn deplete(&mut self) {
        self.stop_ticks();
        self.total_secs = 0;
        self.elapsed_secs = 0;
    }

    fn complete(&mut self) {
        self.deplete();
        self.state = TimerState::Completed;
    }

    fn ensure_active(&self, command: &'static str) -> Result<(), TimerError> {
        if self.state.is_active() {
            Ok(())
        } else {
            debug!(command, state = ?self.state, "rejected: no active timer");
            Err(TimerError::NoActiveTimer)
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    completion_handlers: Mutex<Vec<CompletionHandler>>,
}

impl Shared {
    fn handle_tick(&self, generation: u64, at: DateTime<Utc>) {
        let completed = {
            let mut session = lock(&self.session);
            if session.state != TimerState::Running || session.generation != generation {
                trace!(%at, "ignoring tick from a stale subscription");
                return;
            }

            if !session.is_depleted() {
                session.elapsed_secs += 1;
                trace!(
                    %at,
                    elapsed = session.elapsed_secs,
                    total = session.total_secs,
                    "tick"
                );
            }

            if session.is_depleted() {
                let duration = session.total_secs;
                session.complete();
                Some(duration)
            } else {
                None
            }
        };

        if let Some(duration) = completed {
            info!(duration_secs = duration, "timer completed");
            self.notify_completed();
        }
    }

    fn notify_completed(&self) {
        let handlers: Vec<CompletionHandler> = lock(&self.completion_handlers).clone();
        for handler in handlers {
            handler();
        }
    }
}

/// Single-timer countdown engine.
///
/// Cloning gives another handle to the same timer. All commands and tick
/// handlers are serialized through one internal lock.
#[derive(Clone)]
pub struct CountdownStore {
    clock: Arc<dyn Clock>,
    shared: Arc<Shared>,
}

impl CountdownStore {
    /// Create an idle store that will subscribe to `clock` when started.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            shared: Arc::new(Shared {
                session: Mutex::new(Session::idle()),
                completion_handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        lock(&self.shared.session).state
    }

    /// Seconds currently scheduled, including any added time.
    pub fn seconds_total(&self) -> u64 {
        lock(&self.shared.session).total_secs
    }

    /// Seconds counted since the session started. Pausing keeps this value.
    pub fn seconds_elapsed(&self) -> u64 {
        lock(&self.shared.session).elapsed_secs
    }

    /// Seconds left until depletion; 0 outside a session.
    pub fn seconds_remaining(&self) -> u64 {
        lock(&self.shared.session).remaining_secs()
    }

    /// Duration captured by the most recent start, while a session is active.
    pub fn initial_seconds(&self) -> Option<u64> {
        let session = lock(&self.shared.session);
        session.state.is_active().then_some(session.initial_secs)
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = lock(&self.shared.session);
        Snapshot {
            state: session.state,
            total_secs: session.total_secs,
            elapsed_secs: session.elapsed_secs,
            remaining_secs: session.remaining_secs(),
            initial_secs: session.state.is_active().then_some(session.initial_secs),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh countdown of `minutes * 60 + seconds`.
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidDuration`] when the total is negative,
    /// [`TimerError::TimerAlreadyRunning`] while a session is running or paused.
    pub fn start_new_timer(&self, minutes: i64, seconds: i64) -> Result<(), TimerError> {
        let total = total_seconds(minutes, seconds).inspect_err(|_| {
            debug!(minutes, seconds, "rejected start: invalid duration");
        })?;

        let mut session = lock(&self.shared.session);
        if session.state.is_active() {
            debug!(state = ?session.state, "rejected start: timer already running");
            return Err(TimerError::TimerAlreadyRunning);
        }

        session.deplete();
        session.total_secs = total;
        session.initial_secs = total;
        self.run(&mut session);
        debug!(total_secs = total, "timer started");
        Ok(())
    }

    /// Start a countdown for `preset`.
    ///
    /// # Errors
    ///
    /// Same as [`start_new_timer`](Self::start_new_timer).
    pub fn start_preset(&self, preset: &PresetTimer) -> Result<(), TimerError> {
        debug!(preset = %preset.name, "starting preset");
        self.start_new_timer(i64::from(preset.minutes), i64::from(preset.seconds))
    }

    /// Pause a running timer or resume a paused one.
    ///
    /// # Errors
    ///
    /// [`TimerError::NoActiveTimer`] outside a session.
    pub fn toggle_play_pause_timer(&self) -> Result<(), TimerError> {
        let mut session = lock(&self.shared.session);
        session.ensure_active("toggle")?;

        if session.state == TimerState::Running {
            session.stop_ticks();
            session.state = TimerState::Paused;
            debug!(elapsed_secs = session.elapsed_secs, "timer paused");
        } else {
            self.run(&mut session);
            debug!(elapsed_secs = session.elapsed_secs, "timer resumed");
        }
        Ok(())
    }

    /// Abort the current session. Completion handlers are not invoked.
    ///
    /// # Errors
    ///
    /// [`TimerError::NoActiveTimer`] outside a session.
    pub fn cancel_timer(&self) -> Result<(), TimerError> {
        let mut session = lock(&self.shared.session);
        session.ensure_active("cancel")?;

        session.deplete();
        session.state = TimerState::Cancelled;
        debug!("timer cancelled");
        Ok(())
    }

    /// Extend the current session by `seconds`.
    ///
    /// The extension is not carried over by [`restart_timer`](Self::restart_timer).
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidAmount`] unless `seconds > 0`,
    /// [`TimerError::NoActiveTimer`] outside a session.
    pub fn add_time(&self, seconds: i64) -> Result<(), TimerError> {
        let amount = u64::try_from(seconds)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                debug!(seconds, "rejected add_time: invalid amount");
                TimerError::InvalidAmount
            })?;

        let mut session = lock(&self.shared.session);
        session.ensure_active("add_time")?;

        session.total_secs = session.total_secs.saturating_add(amount);
        debug!(added_secs = amount, total_secs = session.total_secs, "time added");
        Ok(())
    }

    /// Start over from the duration the session was started with.
    ///
    /// # Errors
    ///
    /// [`TimerError::NoActiveTimer`] outside a session.
    pub fn restart_timer(&self) -> Result<(), TimerError> {
        let mut session = lock(&self.shared.session);
        session.ensure_active("restart")?;

        session.deplete();
        session.total_secs = session.initial_secs;
        self.run(&mut session);
        debug!(total_secs = session.total_secs, "timer restarted");
        Ok(())
    }

    /// Register a handler for natural depletion.
    ///
    /// Handlers run in registration order, once per depletion, after the
    /// store's lock has been released. They are never run for a cancelled
    /// timer. A handler must not issue commands on this store synchronously.
    pub fn on_timer_completed<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        lock(&self.shared.completion_handlers).push(Arc::new(handler));
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Enter `Running` with a fresh tick subscription.
    fn run(&self, session: &mut Session) {
        session.stop_ticks();
        session.generation = session.generation.wrapping_add(1);
        session.state = TimerState::Running;

        let generation = session.generation;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let ticker = self.clock.create_ticker(TICK_INTERVAL);
        session.ticks = Some(ticker.start(Box::new(move |at| {
            if let Some(shared) = shared.upgrade() {
                shared.handle_tick(generation, at);
            }
        })));
    }
}

impl std::fmt::Debug for CountdownStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = lock(&self.shared.session);
        f.debug_struct("CountdownStore")
            .field("state", &session.state)
            .field("total_secs", &session.total_secs)
            .field("elapsed_secs", &session.elapsed_secs)
            .field("initial_secs", &session.initial_secs)
            .finish_non_exhaustive()
    }
}

fn total_seconds(minutes: i64, seconds: i64) -> Result<u64, TimerError> {
    minutes
        .checked_mul(SECONDS_IN_MINUTE)
        .and_then(|m| m.checked_add(seconds))
        .and_then(|total| u64::try_from(total).ok())
        .ok_or(TimerError::InvalidDuration)
}

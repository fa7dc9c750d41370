mod clock;
mod policy;
mod store;

pub use clock::{
    AcceleratedClock, Clock, ManualClock, SystemClock, TickHandler, TickSource, TickSubscription,
    ACCELERATED_STEP, TICK_INTERVAL,
};
pub use policy::{format_seconds, Limits, StandardTimerPolicy};
pub use store::{CountdownStore, Snapshot, TimerState};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

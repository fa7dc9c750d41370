//! Property tests for the countdown store's command laws.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use menutimer_core::{CountdownStore, ManualClock, TimerError, TimerState};
use proptest::prelude::*;

fn setup() -> (CountdownStore, ManualClock) {
    let clock = ManualClock::new();
    (CountdownStore::new(Arc::new(clock.clone())), clock)
}

/// Bring a fresh store into the given terminal state.
fn store_in(state: TimerState) -> (CountdownStore, ManualClock) {
    let (store, clock) = setup();
    match state {
        TimerState::Idle => {}
        TimerState::Completed => {
            store.start_new_timer(0, 1).unwrap();
            clock.advance(1);
        }
        TimerState::Cancelled => {
            store.start_new_timer(1, 0).unwrap();
            store.cancel_timer().unwrap();
        }
        TimerState::Running | TimerState::Paused => unreachable!("not a terminal state"),
    }
    assert_eq!(store.state(), state);
    (store, clock)
}

fn terminal_state() -> impl Strategy<Value = TimerState> {
    prop_oneof![
        Just(TimerState::Idle),
        Just(TimerState::Completed),
        Just(TimerState::Cancelled),
    ]
}

proptest! {
    #[test]
    fn start_succeeds_from_terminal_states(
        from in terminal_state(),
        minutes in 0i64..=99,
        seconds in 0i64..=99,
    ) {
        let (store, _clock) = store_in(from);
        let total = (minutes * 60 + seconds) as u64;

        prop_assert_eq!(store.start_new_timer(minutes, seconds), Ok(()));
        prop_assert_eq!(store.state(), TimerState::Running);
        prop_assert_eq!(store.seconds_total(), total);
        prop_assert_eq!(store.seconds_remaining(), total);
    }

    #[test]
    fn negative_totals_are_rejected(
        from in terminal_state(),
        minutes in -1000i64..0,
        seconds in 0i64..60,
    ) {
        let (store, _clock) = store_in(from);
        prop_assert_eq!(
            store.start_new_timer(minutes, seconds),
            Err(TimerError::InvalidDuration)
        );
        prop_assert_eq!(store.state(), from);
        prop_assert_eq!(store.seconds_total(), 0);
    }

    #[test]
    fn double_toggle_restores_elapsed(total in 5i64..500, ticks in 0u64..5) {
        let (store, clock) = setup();
        store.start_new_timer(0, total).unwrap();
        clock.advance(ticks);
        let elapsed = store.seconds_elapsed();

        store.toggle_play_pause_timer().unwrap();
        clock.advance(ticks + 3);
        store.toggle_play_pause_timer().unwrap();

        prop_assert_eq!(store.state(), TimerState::Running);
        prop_assert_eq!(store.seconds_elapsed(), elapsed);
    }

    #[test]
    fn add_time_adds_exactly(start in 1i64..1000, extra in 1i64..10_000, paused in any::<bool>()) {
        let (store, _clock) = setup();
        store.start_new_timer(0, start).unwrap();
        if paused {
            store.toggle_play_pause_timer().unwrap();
        }
        let state = store.state();
        let before = store.seconds_total();

        prop_assert_eq!(store.add_time(extra), Ok(()));
        prop_assert_eq!(store.seconds_total(), before + extra as u64);
        prop_assert_eq!(store.state(), state);
    }

    #[test]
    fn non_positive_amounts_are_rejected(amount in i64::MIN..=0) {
        let (store, _clock) = setup();
        store.start_new_timer(1, 0).unwrap();
        prop_assert_eq!(store.add_time(amount), Err(TimerError::InvalidAmount));
        prop_assert_eq!(store.seconds_total(), 60);
    }

    #[test]
    fn restart_restores_initial_duration(
        start in 1i64..600,
        extra in 1i64..600,
        ticks in 0u64..3,
        paused in any::<bool>(),
    ) {
        let (store, clock) = setup();
        store.start_new_timer(0, start).unwrap();
        store.add_time(extra).unwrap();
        clock.advance(ticks);
        if paused {
            store.toggle_play_pause_timer().unwrap();
        }

        prop_assert_eq!(store.restart_timer(), Ok(()));
        prop_assert_eq!(store.seconds_total(), start as u64);
        prop_assert_eq!(store.seconds_elapsed(), 0);
        prop_assert_eq!(store.state(), TimerState::Running);
    }

    #[test]
    fn depletion_after_n_ticks_fires_each_handler_once(n in 0u64..200, handlers in 1usize..4) {
        let (store, clock) = setup();
        let counts: Vec<_> = (0..handlers).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        for count in &counts {
            let count = Arc::clone(count);
            store.on_timer_completed(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        store.start_new_timer(0, n as i64).unwrap();
        // A zero-length timer still needs one tick to notice it is done.
        clock.advance(n.max(1));

        prop_assert_eq!(store.state(), TimerState::Completed);
        prop_assert_eq!(store.seconds_total(), 0);
        prop_assert_eq!(store.seconds_elapsed(), 0);
        prop_assert_eq!(store.seconds_remaining(), 0);
        for count in &counts {
            prop_assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        clock.advance(5);
        for count in &counts {
            prop_assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn elapsed_never_exceeds_total(total in 0i64..50, ticks in 0u64..80) {
        let (store, clock) = setup();
        store.start_new_timer(0, total).unwrap();
        for _ in 0..ticks {
            clock.advance(1);
            prop_assert!(store.seconds_elapsed() <= store.seconds_total());
        }
    }
}

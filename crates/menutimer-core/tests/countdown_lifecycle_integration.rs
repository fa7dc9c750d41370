//! Integration tests for the countdown lifecycle.
//!
//! A manual clock drives every scenario, so each tick is one simulated
//! second and nothing waits on real time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use menutimer_core::{CountdownStore, ManualClock, PresetTimers, TimerError, TimerState};

fn setup() -> (CountdownStore, ManualClock) {
    let clock = ManualClock::new();
    let store = CountdownStore::new(Arc::new(clock.clone()));
    (store, clock)
}

fn completion_counter(store: &CountdownStore) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    store.on_timer_completed(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[test]
fn two_second_timer_completes_after_two_ticks() {
    let (store, clock) = setup();
    let completions = completion_counter(&store);

    store.start_new_timer(0, 2).unwrap();
    clock.advance(2);

    assert_eq!(store.state(), TimerState::Completed);
    assert_eq!(store.seconds_total(), 0);
    assert_eq!(store.seconds_elapsed(), 0);
    assert_eq!(store.seconds_remaining(), 0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn added_time_is_counted_before_depletion() {
    let (store, clock) = setup();
    let completions = completion_counter(&store);

    store.start_new_timer(0, 3).unwrap();
    store.add_time(2).unwrap();

    clock.advance(4);
    assert_eq!(store.state(), TimerState::Running);
    assert_eq!(store.seconds_remaining(), 1);

    clock.advance(1);
    assert_eq!(store.state(), TimerState::Completed);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_terminates_the_session() {
    let (store, _clock) = setup();

    store.start_new_timer(10, 0).unwrap();
    store.cancel_timer().unwrap();

    assert_eq!(store.restart_timer(), Err(TimerError::NoActiveTimer));
    assert_eq!(store.state(), TimerState::Cancelled);
}

#[test]
fn cancel_never_fires_completion() {
    let (store, clock) = setup();
    let completions = completion_counter(&store);

    store.start_new_timer(0, 3).unwrap();
    clock.advance(2);
    store.cancel_timer().unwrap();
    clock.advance(10);

    assert_eq!(completions.load(Ordering::SeqCst), 0);
}

#[test]
fn start_pause_resume_complete() {
    let (store, clock) = setup();
    let completions = completion_counter(&store);

    store.start_new_timer(0, 2).unwrap();
    clock.advance(1);
    store.toggle_play_pause_timer().unwrap();
    assert_eq!(store.state(), TimerState::Paused);
    assert_eq!(store.seconds_elapsed(), 1);

    clock.advance(30);
    assert_eq!(store.seconds_elapsed(), 1, "time must not advance while paused");

    store.toggle_play_pause_timer().unwrap();
    clock.advance(1);
    assert_eq!(store.state(), TimerState::Completed);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn handlers_fire_in_registration_order_once_per_depletion() {
    let (store, clock) = setup();
    let order = Arc::new(Mutex::new(Vec::new()));
    for id in 0..3 {
        let order = Arc::clone(&order);
        store.on_timer_completed(move || order.lock().unwrap().push(id));
    }

    store.start_new_timer(0, 1).unwrap();
    clock.advance(5);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);

    store.start_new_timer(0, 1).unwrap();
    clock.advance(1);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 0, 1, 2]);
}

#[test]
fn new_timer_cannot_preempt_active_one() {
    let (store, clock) = setup();

    store.start_new_timer(10, 0).unwrap();
    clock.advance(3);
    assert_eq!(
        store.start_new_timer(5, 0),
        Err(TimerError::TimerAlreadyRunning)
    );
    assert_eq!(store.seconds_total(), 600);
    assert_eq!(store.seconds_elapsed(), 3);

    store.toggle_play_pause_timer().unwrap();
    assert_eq!(
        store.start_new_timer(5, 0),
        Err(TimerError::TimerAlreadyRunning)
    );
    assert_eq!(store.state(), TimerState::Paused);
}

#[test]
fn restart_after_extension_uses_original_duration() {
    let (store, clock) = setup();
    let completions = completion_counter(&store);

    store.start_new_timer(0, 5).unwrap();
    store.add_time(60).unwrap();
    clock.advance(10);
    store.restart_timer().unwrap();

    assert_eq!(store.seconds_total(), 5);
    assert_eq!(store.seconds_elapsed(), 0);
    assert_eq!(completions.load(Ordering::SeqCst), 0);

    clock.advance(5);
    assert_eq!(store.state(), TimerState::Completed);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn start_from_preset() {
    let (store, clock) = setup();
    let presets = PresetTimers::default();
    let short_break = presets.find_by_name("Short Break").unwrap();

    store.start_preset(short_break).unwrap();
    assert_eq!(store.seconds_total(), 300);

    clock.advance(300);
    assert_eq!(store.state(), TimerState::Completed);
}

#[test]
fn tick_subscription_exists_only_while_running() {
    let (store, clock) = setup();
    assert_eq!(clock.active_tickers(), 0);

    store.start_new_timer(0, 3).unwrap();
    assert_eq!(clock.active_tickers(), 1);

    store.toggle_play_pause_timer().unwrap();
    assert_eq!(clock.active_tickers(), 0);

    store.toggle_play_pause_timer().unwrap();
    assert_eq!(clock.active_tickers(), 1);

    clock.advance(3);
    assert_eq!(store.state(), TimerState::Completed);
    assert_eq!(clock.active_tickers(), 0);
}

#[test]
fn cloned_handles_share_the_timer() {
    let (store, clock) = setup();
    let menu_label = store.clone();

    store.start_new_timer(1, 0).unwrap();
    clock.advance(20);
    assert_eq!(menu_label.seconds_remaining(), 40);

    menu_label.cancel_timer().unwrap();
    assert_eq!(store.state(), TimerState::Cancelled);
}

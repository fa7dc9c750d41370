use std::future::Future;
use std::sync::Arc;

use clap::Args;
use menutimer_core::{Config, CountdownStore, Snapshot, SystemClock, TICK_INTERVAL};
use serde_json::json;
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Args)]
pub struct StartArgs {
    /// Minutes (defaults to timer.default_minutes when no duration is given)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "preset")]
    minutes: Option<i64>,
    /// Seconds
    #[arg(long, allow_negative_numbers = true, conflicts_with = "preset")]
    seconds: Option<i64>,
    /// Start a configured preset by name
    #[arg(long)]
    preset: Option<String>,
    /// Extend by this many timer.add_time_step_secs steps right after starting
    #[arg(long, default_value = "0")]
    extend: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
}

fn print_snapshot(snapshot: &Snapshot) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(snapshot)?);
    Ok(())
}

fn start(
    store: &CountdownStore,
    args: &StartArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = &args.preset {
        let preset = config
            .presets
            .find_by_name(name)
            .ok_or_else(|| format!("unknown preset: {name}"))?;
        store.start_preset(preset)?;
    } else {
        let (minutes, seconds) = match (args.minutes, args.seconds) {
            (None, None) => (
                i64::from(config.timer.default_minutes),
                i64::from(config.timer.default_seconds),
            ),
            (minutes, seconds) => (minutes.unwrap_or(0), seconds.unwrap_or(0)),
        };
        store.start_new_timer(minutes, seconds)?;
    }

    if args.extend > 0 {
        let extra = u64::from(args.extend).saturating_mul(config.timer.add_time_step_secs);
        store.add_time(i64::try_from(extra).unwrap_or(i64::MAX))?;
    }
    Ok(())
}

fn completion_signal(store: &CountdownStore) -> Arc<Notify> {
    let done = Arc::new(Notify::new());
    let notify = Arc::clone(&done);
    store.on_timer_completed(move || notify.notify_one());
    done
}

/// Run one countdown to completion, printing a snapshot every second.
///
/// Ctrl-C cancels the timer.
pub async fn run(args: StartArgs, config: &Config) -> Result<Outcome, Box<dyn std::error::Error>> {
    let store = CountdownStore::new(Arc::new(SystemClock::current()?));
    let done = completion_signal(&store);

    start(&store, &args, config)?;
    supervise(&store, &done, tokio::signal::ctrl_c()).await
}

/// Report on a started timer until it completes or `shutdown` resolves.
///
/// Resolving `shutdown` cancels the timer.
async fn supervise<F>(
    store: &CountdownStore,
    done: &Notify,
    shutdown: F,
) -> Result<Outcome, Box<dyn std::error::Error>>
where
    F: Future,
{
    let duration = store.seconds_total();
    tracing::info!(duration_secs = duration, "countdown started");

    let mut report = interval(TICK_INTERVAL);
    report.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = done.notified() => {
                print_snapshot(&store.snapshot())?;
                println!("{}", json!({ "type": "timer_completed", "duration_secs": duration }));
                return Ok(Outcome::Completed);
            }
            _ = &mut shutdown => {
                store.cancel_timer()?;
                print_snapshot(&store.snapshot())?;
                return Ok(Outcome::Cancelled);
            }
            _ = report.tick() => {
                print_snapshot(&store.snapshot())?;
            }
        }
    }
}

//! # menutimer Core Library
//!
//! The countdown engine behind a menu-bar timer. The engine knows nothing
//! about rendering, audio or persistence; a front end issues commands,
//! polls the derived values and subscribes to completion.
//!
//! ## Architecture
//!
//! - **Clock**: hands out tick sources. Production ticks once per second on
//!   a tokio runtime; tests use an accelerated or manually driven clock
//! - **Countdown Store**: the single-timer state machine, fed by clock ticks
//! - **Presets**: named durations, capped at five
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CountdownStore`]: Core timer state machine
//! - [`Clock`]: Tick source abstraction
//! - [`PresetTimers`]: Preset collection
//! - [`Config`]: Application configuration

pub mod error;
pub mod presets;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, PresetError, TimerError};
pub use presets::{PresetTimer, PresetTimers, MAX_PRESETS};
pub use storage::Config;
pub use timer::{
    format_seconds, AcceleratedClock, Clock, CountdownStore, ManualClock, Snapshot, SystemClock,
    TimerState, TICK_INTERVAL,
};

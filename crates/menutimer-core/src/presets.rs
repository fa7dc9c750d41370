//! Named countdown durations.
//!
//! Presets are held in memory; saving them anywhere is left to the caller
//! (they round-trip through serde, and the config file can list them).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PresetError;
use crate::timer::StandardTimerPolicy;

/// Upper bound on the number of presets a user can keep.
pub const MAX_PRESETS: usize = 5;

const POMODORO_ID: Uuid = Uuid::from_u128(0x6d65_6e75_7469_6d65_7200_0000_0000_0001);
const SHORT_BREAK_ID: Uuid = Uuid::from_u128(0x6d65_6e75_7469_6d65_7200_0000_0000_0002);
const LONG_BREAK_ID: Uuid = Uuid::from_u128(0x6d65_6e75_7469_6d65_7200_0000_0000_0003);

/// Namespace for ids derived from the name of a preset saved without one.
const PRESET_NAMESPACE: Uuid = Uuid::from_u128(0x6d65_6e75_7469_6d65_7200_0000_0000_0000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PresetRecord")]
pub struct PresetTimer {
    pub id: Uuid,
    pub name: String,
    pub minutes: u32,
    pub seconds: u32,
}

/// On-disk shape of a preset. Both `id` and `seconds` may be left out.
#[derive(Deserialize)]
struct PresetRecord {
    id: Option<Uuid>,
    name: String,
    minutes: u32,
    #[serde(default)]
    seconds: u32,
}

impl From<PresetRecord> for PresetTimer {
    fn from(record: PresetRecord) -> Self {
        // Same name, same id: hand-written presets stay addressable across loads.
        let id = record
            .id
            .unwrap_or_else(|| Uuid::new_v5(&PRESET_NAMESPACE, record.name.as_bytes()));
        Self {
            id,
            name: record.name,
            minutes: record.minutes,
            seconds: record.seconds,
        }
    }
}

impl PresetTimer {
    pub fn new(name: impl Into<String>, minutes: u32, seconds: u32) -> Self {
        Self::with_id(Uuid::new_v4(), name, minutes, seconds)
    }

    fn with_id(id: Uuid, name: impl Into<String>, minutes: u32, seconds: u32) -> Self {
        Self {
            id,
            name: name.into(),
            minutes,
            seconds,
        }
    }

    /// Build a preset, rejecting fields outside the standard input limits.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::InvalidDuration`] if minutes or seconds exceed 99.
    pub fn validated(
        name: impl Into<String>,
        minutes: u32,
        seconds: u32,
    ) -> Result<Self, PresetError> {
        StandardTimerPolicy.validate(minutes, seconds)?;
        Ok(Self::new(name, minutes, seconds))
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    pub fn pomodoro() -> Self {
        Self::with_id(POMODORO_ID, "Pomodoro", 25, 0)
    }

    pub fn short_break() -> Self {
        Self::with_id(SHORT_BREAK_ID, "Short Break", 5, 0)
    }

    pub fn long_break() -> Self {
        Self::with_id(LONG_BREAK_ID, "Long Break", 15, 0)
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::pomodoro(), Self::short_break(), Self::long_break()]
    }
}

/// Ordered, capped list of presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTimers {
    presets: Vec<PresetTimer>,
}

impl PresetTimers {
    /// Wrap an existing list. Entries beyond [`MAX_PRESETS`] are dropped.
    pub fn from_vec(mut presets: Vec<PresetTimer>) -> Self {
        presets.truncate(MAX_PRESETS);
        Self { presets }
    }

    /// # Errors
    ///
    /// Returns [`PresetError::MaxPresetsReached`] when the list is full.
    pub fn add(&mut self, preset: PresetTimer) -> Result<(), PresetError> {
        if self.presets.len() >= MAX_PRESETS {
            return Err(PresetError::MaxPresetsReached { max: MAX_PRESETS });
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Replace the preset with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::NotFound`] if no preset has that id.
    pub fn update(&mut self, preset: PresetTimer) -> Result<(), PresetError> {
        let slot = self
            .presets
            .iter_mut()
            .find(|p| p.id == preset.id)
            .ok_or(PresetError::NotFound(preset.id))?;
        *slot = preset;
        Ok(())
    }

    /// Remove the preset with `id`, if present.
    pub fn remove(&mut self, id: Uuid) -> Option<PresetTimer> {
        let index = self.presets.iter().position(|p| p.id == id)?;
        Some(self.presets.remove(index))
    }

    pub fn reset_to_defaults(&mut self) {
        self.presets = PresetTimer::defaults();
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&PresetTimer> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, id: Uuid) -> Option<&PresetTimer> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresetTimer> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.presets.len() >= MAX_PRESETS
    }
}

impl Default for PresetTimers {
    fn default() -> Self {
        Self {
            presets: PresetTimer::defaults(),
        }
    }
}

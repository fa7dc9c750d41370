//! Input limits and display formatting for countdown durations.

use serde::{Deserialize, Serialize};

use crate::error::PresetError;

/// Inclusive range accepted for one duration field, plus its display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub min: u32,
    pub max: u32,
    pub digit_count: usize,
}

impl Limits {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Two-digit minutes and seconds, each `0..=99`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardTimerPolicy;

impl StandardTimerPolicy {
    pub const LIMITS: Limits = Limits {
        min: 0,
        max: 99,
        digit_count: 2,
    };

    pub fn minutes_limits(&self) -> Limits {
        Self::LIMITS
    }

    pub fn seconds_limits(&self) -> Limits {
        Self::LIMITS
    }

    /// Check a duration entered as separate minutes and seconds.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::InvalidDuration`] if either field is out of range.
    pub fn validate(&self, minutes: u32, seconds: u32) -> Result<(), PresetError> {
        if self.minutes_limits().contains(minutes) && self.seconds_limits().contains(seconds) {
            Ok(())
        } else {
            Err(PresetError::InvalidDuration { minutes, seconds })
        }
    }

    pub fn to_readable_time(&self, seconds: u64) -> String {
        format_seconds(seconds)
    }
}

/// Render seconds as `MM:SS`. Minutes are padded to two digits and may grow
/// past 99.
pub fn format_seconds(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

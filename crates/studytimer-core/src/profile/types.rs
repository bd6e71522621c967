//! Profile data model.
//!
//! A profile is a named set of timer durations plus the lifetime statistics
//! the session engine accrues against it. Durations are edited by the host
//! while the engine is idle; the statistics fields are only ever written by
//! the engine.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Allowed profile name length, in characters.
pub const NAME_LEN: RangeInclusive<usize> = 1..=128;
/// Allowed study phase length, in minutes.
pub const STUDY_MINUTES: RangeInclusive<u32> = 1..=180;
/// Allowed short break length, in minutes.
pub const BREAK_MINUTES: RangeInclusive<u32> = 1..=60;
/// Allowed long break length, in minutes.
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 5..=120;

/// A named study configuration with its lifetime statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub study_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    /// Every Nth completed study phase in a run is followed by a long break.
    pub sessions_until_long_break: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Seconds of study credited to this profile.
    #[serde(default)]
    pub total_study_time: u64,
    /// Number of runs started.
    #[serde(default)]
    pub total_sessions: u32,
    /// Number of study phases that ran to their full duration.
    #[serde(default)]
    pub completed_sessions: u32,
}

fn default_true() -> bool {
    true
}

impl Profile {
    /// Create a profile with fresh statistics and both alerts enabled.
    pub fn new(
        name: impl Into<String>,
        study_minutes: u32,
        break_minutes: u32,
        long_break_minutes: u32,
        sessions_until_long_break: u32,
    ) -> Self {
        Self {
            name: name.into(),
            study_minutes,
            break_minutes,
            long_break_minutes,
            sessions_until_long_break,
            sound_enabled: true,
            notifications_enabled: true,
            total_study_time: 0,
            total_sessions: 0,
            completed_sessions: 0,
        }
    }

    /// Study phase length in seconds.
    pub fn study_secs(&self) -> u64 {
        u64::from(self.study_minutes) * 60
    }

    /// Minutes of the break that follows a study phase.
    pub fn break_minutes_for(&self, is_long_break: bool) -> u32 {
        if is_long_break {
            self.long_break_minutes
        } else {
            self.break_minutes
        }
    }

    /// Break length in seconds.
    pub fn break_secs(&self, is_long_break: bool) -> u64 {
        u64::from(self.break_minutes_for(is_long_break)) * 60
    }

    /// Whether the `completed`-th study phase of a run earns a long break.
    pub fn is_long_break_after(&self, completed: u32) -> bool {
        completed > 0 && completed % self.sessions_until_long_break.max(1) == 0
    }

    /// Total study time split into whole hours and leftover minutes.
    pub fn study_time_hm(&self) -> (u64, u64) {
        (self.total_study_time / 3600, (self.total_study_time % 3600) / 60)
    }

    /// Check every configurable field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.trim().chars().count();
        if !NAME_LEN.contains(&name_len) {
            return Err(ValidationError::invalid(
                "name",
                format!("must be {}..={} characters", NAME_LEN.start(), NAME_LEN.end()),
            ));
        }
        check_range("study_minutes", self.study_minutes, &STUDY_MINUTES)?;
        check_range("break_minutes", self.break_minutes, &BREAK_MINUTES)?;
        check_range("long_break_minutes", self.long_break_minutes, &LONG_BREAK_MINUTES)?;
        if self.long_break_minutes < self.break_minutes {
            return Err(ValidationError::invalid(
                "long_break_minutes",
                format!(
                    "must be at least break_minutes ({})",
                    self.break_minutes
                ),
            ));
        }
        if self.sessions_until_long_break == 0 {
            return Err(ValidationError::invalid(
                "sessions_until_long_break",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Pull every configurable field back into range, keeping statistics.
    ///
    /// Used on data read from disk, where a hand-edited file should not
    /// cost the user their history. `position` names unnamed profiles.
    pub fn repaired(mut self, position: usize) -> Self {
        if self.name.trim().is_empty() {
            self.name = format!("Profile {}", position + 1);
        }
        if self.name.chars().count() > *NAME_LEN.end() {
            self.name = self.name.chars().take(*NAME_LEN.end()).collect();
        }
        self.study_minutes = clamp(self.study_minutes, &STUDY_MINUTES);
        self.break_minutes = clamp(self.break_minutes, &BREAK_MINUTES);
        self.long_break_minutes =
            clamp(self.long_break_minutes, &LONG_BREAK_MINUTES).max(self.break_minutes);
        self.sessions_until_long_break = self.sessions_until_long_break.max(1);
        self
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("Default", 25, 5, 15, 4)
    }
}

fn check_range(
    field: &str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            field,
            format!("{value} is outside {}..={}", range.start(), range.end()),
        ))
    }
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

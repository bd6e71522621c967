//! Per-run study log.
//!
//! Lifetime counters live on each [`Profile`]. In addition, every run that
//! ends (stopped, or finished by a break without autostart) appends one
//! [`RunRecord`] so `stats` can show what was studied and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// One finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Profile name at the time of the run.
    pub profile: String,
    pub subject: String,
    /// Study seconds credited to the profile by this run.
    pub study_seconds: u64,
    /// Study phases counted as completed during this run.
    pub completed_phases: u32,
    /// `true` when the run was stopped by hand.
    pub stopped: bool,
}

impl RunRecord {
    /// Whole minutes studied, rounded down.
    pub fn study_minutes(&self) -> u64 {
        self.study_seconds / 60
    }
}

/// Baseline captured when a run starts; the record is the difference
/// between it and the profile's counters when the run ends.
#[derive(Debug, Clone)]
pub(crate) struct RunTracker {
    pub(crate) profile_index: usize,
    started_at: DateTime<Utc>,
    subject: String,
    study_time_before: u64,
    completed_before: u32,
}

impl RunTracker {
    pub(crate) fn begin(
        profile_index: usize,
        profile: &Profile,
        subject: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            profile_index,
            started_at,
            subject: subject.into(),
            study_time_before: profile.total_study_time,
            completed_before: profile.completed_sessions,
        }
    }

    pub(crate) fn finish(self, profile: &Profile, stopped: bool, ended_at: DateTime<Utc>) -> RunRecord {
        RunRecord {
            started_at: self.started_at,
            ended_at,
            profile: profile.name.clone(),
            subject: self.subject,
            study_seconds: profile.total_study_time.saturating_sub(self.study_time_before),
            completed_phases: profile.completed_sessions.saturating_sub(self.completed_before),
            stopped,
        }
    }
}

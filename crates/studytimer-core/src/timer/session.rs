//! Run-state of the session engine.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// A phase that accrues time and can therefore be paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivePhase {
    Studying,
    Breaking,
}

impl From<ActivePhase> for Phase {
    fn from(active: ActivePhase) -> Self {
        match active {
            ActivePhase::Studying => Phase::Studying,
            ActivePhase::Breaking => Phase::Breaking,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Studying,
    Breaking,
    /// Paused out of the wrapped phase; resume returns to it.
    Paused(ActivePhase),
}

impl Phase {
    /// The phase whose counter is (or was, before pausing) running.
    pub fn active(self) -> Option<ActivePhase> {
        match self {
            Phase::Studying => Some(ActivePhase::Studying),
            Phase::Breaking => Some(ActivePhase::Breaking),
            Phase::Paused(from) => Some(from),
            Phase::Idle => None,
        }
    }

    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Phase::Paused(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Studying => "studying",
            Phase::Breaking => "breaking",
            Phase::Paused(_) => "paused",
        };
        f.write_str(name)
    }
}

/// The single mutable run-state owned by the engine.
///
/// Empty (idle, zeroed) until a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) profile_index: usize,
    pub(crate) elapsed_study_seconds: u64,
    pub(crate) elapsed_break_seconds: u64,
    pub(crate) completed_study_phases_this_run: u32,
    pub(crate) is_long_break: bool,
    pub(crate) pause_anchor: Option<Instant>,
    pub(crate) subject: String,
    /// Reading of the previous tick; `None` while idle or paused.
    last_tick: Option<Instant>,
    /// Sub-second (or pre-pause) time not yet added to a counter.
    carry: Duration,
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile_index(&self) -> usize {
        self.profile_index
    }

    pub fn elapsed_study_seconds(&self) -> u64 {
        self.elapsed_study_seconds
    }

    pub fn elapsed_break_seconds(&self) -> u64 {
        self.elapsed_break_seconds
    }

    pub fn completed_study_phases_this_run(&self) -> u32 {
        self.completed_study_phases_this_run
    }

    pub fn is_long_break(&self) -> bool {
        self.is_long_break
    }

    pub fn pause_anchor(&self) -> Option<Instant> {
        self.pause_anchor
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Begin a fresh run in the study phase.
    pub(crate) fn begin(&mut self, profile_index: usize, subject: String, now: Instant) {
        *self = Session {
            phase: Phase::Studying,
            profile_index,
            subject,
            last_tick: Some(now),
            ..Session::default()
        };
    }

    /// Move to `phase` with both phase counters zeroed and the clock
    /// restarted at `now`. Overshoot from the previous phase is dropped.
    pub(crate) fn enter(&mut self, phase: ActivePhase, now: Instant) {
        self.phase = phase.into();
        self.elapsed_study_seconds = 0;
        self.elapsed_break_seconds = 0;
        self.last_tick = Some(now);
        self.carry = Duration::ZERO;
    }

    /// Return to idle, keeping only the profile selection.
    pub(crate) fn reset(&mut self) {
        *self = Session {
            profile_index: self.profile_index,
            ..Session::default()
        };
    }

    /// Whole seconds elapsed since the previous tick; remainders carry over.
    pub(crate) fn take_elapsed(&mut self, now: Instant) -> u64 {
        let last = self.last_tick.replace(now).unwrap_or(now);
        let total = self.carry + now.saturating_duration_since(last);
        let whole = total.as_secs();
        self.carry = total - Duration::from_secs(whole);
        whole
    }

    /// Stop the clock, banking time since the last tick for the next one.
    pub(crate) fn suspend(&mut self, from: ActivePhase, now: Instant) {
        if let Some(last) = self.last_tick.take() {
            self.carry += now.saturating_duration_since(last);
        }
        self.pause_anchor = Some(now);
        self.phase = Phase::Paused(from);
    }

    /// Restart the clock at `now`; returns how long the pause lasted.
    pub(crate) fn unsuspend(&mut self, from: ActivePhase, now: Instant) -> Duration {
        let paused_for = self
            .pause_anchor
            .take()
            .map(|anchor| now.saturating_duration_since(anchor))
            .unwrap_or_default();
        self.last_tick = Some(now);
        self.phase = from.into();
        paused_for
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            profile_index: 0,
            elapsed_study_seconds: 0,
            elapsed_break_seconds: 0,
            completed_study_phases_this_run: 0,
            is_long_break: false,
            pause_anchor: None,
            subject: String::new(),
            last_tick: None,
            carry: Duration::ZERO,
        }
    }
}

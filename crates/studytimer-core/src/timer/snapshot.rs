use serde::Serialize;

use super::session::{ActivePhase, Phase, Session};
use crate::profile::ProfileStore;

/// A read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub profile_index: usize,
    pub profile_name: String,
    pub subject: String,
    /// Seconds into the current (or paused) phase.
    pub elapsed_secs: u64,
    /// Length of the current phase; the study length while idle.
    pub target_secs: u64,
    pub remaining_secs: u64,
    /// 0.0 .. 100.0 progress within the current phase.
    pub progress_pct: f64,
    pub is_long_break: bool,
    pub completed_study_phases_this_run: u32,
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &Session, store: &ProfileStore) -> Self {
        let profile_index = if session.phase.is_idle() {
            store.active_index()
        } else {
            session.profile_index
        };
        let profile = store.get(profile_index).unwrap_or_else(|| store.active());

        let (elapsed_secs, target_secs) = match session.phase.active() {
            Some(ActivePhase::Studying) => (session.elapsed_study_seconds, profile.study_secs()),
            Some(ActivePhase::Breaking) => (
                session.elapsed_break_seconds,
                profile.break_secs(session.is_long_break),
            ),
            None => (0, profile.study_secs()),
        };
        let progress_pct = if target_secs == 0 {
            0.0
        } else {
            (elapsed_secs as f64 / target_secs as f64 * 100.0).min(100.0)
        };

        Self {
            phase: session.phase,
            profile_index,
            profile_name: profile.name.clone(),
            subject: session.subject.clone(),
            elapsed_secs,
            target_secs,
            remaining_secs: target_secs.saturating_sub(elapsed_secs),
            progress_pct,
            is_long_break: session.is_long_break,
            completed_study_phases_this_run: session.completed_study_phases_this_run,
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn remaining_clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

/// Render seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

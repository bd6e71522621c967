//! Session engine implementation.
//!
//! The engine is a tick-driven state machine. It has no thread and does no
//! I/O: the host calls `tick()` at a steady cadence (once a second is
//! plenty) and forwards user commands. Counters advance by measured delta
//! time, so a late or missed tick never loses time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Studying -> Breaking -> (Studying | Idle)
//!           |  ^         |  ^
//!           v  |         v  |
//!          Paused       Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.start(&mut store, 0, "Algebra", clock.now())?;
//! // In a loop:
//! engine.tick(&mut store, &settings, clock.now())?; // Some(event) at a phase boundary
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::command::{Command, Outcome};
use super::session::{ActivePhase, Phase, Session};
use super::snapshot::SessionSnapshot;
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::notify::{LogSink, NotificationSink};
use crate::profile::ProfileStore;
use crate::storage::GlobalSettings;

/// What `stop()` credited to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopSummary {
    pub profile_index: usize,
    /// Study seconds added to `total_study_time`.
    pub credited_study_seconds: u64,
    /// Whether the stop also counted a completed study phase.
    pub counted_completion: bool,
}

/// Core session engine.
///
/// Owns the [`Session`] and the sink it reports phase boundaries to. The
/// profile store and settings stay with the host and are borrowed per call.
#[derive(Debug)]
pub struct SessionEngine<N = LogSink> {
    session: Session,
    sink: N,
}

impl SessionEngine<LogSink> {
    /// An idle engine that logs its events.
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }
}

impl Default for SessionEngine<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NotificationSink> SessionEngine<N> {
    pub fn with_sink(sink: N) -> Self {
        Self {
            session: Session::default(),
            sink,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn is_idle(&self) -> bool {
        self.session.phase.is_idle()
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    /// Display-oriented view of the session against `store`.
    pub fn snapshot(&self, store: &ProfileStore) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, store)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run on `profile_index`, which also becomes the active profile.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless idle, `ProfileNotFound` for a bad index.
    pub fn start(
        &mut self,
        store: &mut ProfileStore,
        profile_index: usize,
        subject: impl Into<String>,
        now: Instant,
    ) -> Result<(), SessionError> {
        self.require_idle("start")?;
        let len = store.len();
        let profile = store
            .get_mut(profile_index)
            .ok_or(SessionError::ProfileNotFound {
                index: profile_index,
                len,
            })?;
        profile.total_sessions = profile.total_sessions.saturating_add(1);
        let subject = subject.into();
        debug!(profile = %profile.name, subject = %subject, "run started");

        store
            .set_active(profile_index)
            .map_err(|_| SessionError::ProfileNotFound {
                index: profile_index,
                len,
            })?;
        self.session.begin(profile_index, subject, now);
        Ok(())
    }

    /// Advance the running phase by the time elapsed since the last tick.
    ///
    /// Returns the event emitted when a phase boundary is crossed; the same
    /// event has already been handed to the sink. A no-op while idle or
    /// paused.
    ///
    /// # Errors
    ///
    /// `ProfileNotFound` if the run's profile has disappeared from the
    /// store; the session is left untouched.
    pub fn tick(
        &mut self,
        store: &mut ProfileStore,
        settings: &GlobalSettings,
        now: Instant,
    ) -> Result<Option<SessionEvent>, SessionError> {
        let active = match self.session.phase {
            Phase::Studying => ActivePhase::Studying,
            Phase::Breaking => ActivePhase::Breaking,
            Phase::Idle | Phase::Paused(_) => return Ok(None),
        };
        let index = self.session.profile_index;
        let len = store.len();
        let profile = store
            .get_mut(index)
            .ok_or(SessionError::ProfileNotFound { index, len })?;

        let secs = self.session.take_elapsed(now);
        let s = &mut self.session;
        let event = match active {
            ActivePhase::Studying => {
                s.elapsed_study_seconds = s.elapsed_study_seconds.saturating_add(secs);
                let target = profile.study_secs();
                if s.elapsed_study_seconds < target {
                    return Ok(None);
                }
                profile.total_study_time = profile.total_study_time.saturating_add(target);
                profile.completed_sessions = profile.completed_sessions.saturating_add(1);
                s.completed_study_phases_this_run += 1;
                s.is_long_break = profile.is_long_break_after(s.completed_study_phases_this_run);
                s.enter(ActivePhase::Breaking, now);
                info!(
                    profile = %profile.name,
                    completed_this_run = s.completed_study_phases_this_run,
                    is_long_break = s.is_long_break,
                    "study phase complete"
                );
                SessionEvent::StudyPhaseComplete {
                    is_long_break: s.is_long_break,
                    break_minutes: profile.break_minutes_for(s.is_long_break),
                }
            }
            ActivePhase::Breaking => {
                s.elapsed_break_seconds = s.elapsed_break_seconds.saturating_add(secs);
                if s.elapsed_break_seconds < profile.break_secs(s.is_long_break) {
                    return Ok(None);
                }
                let auto_started = settings.autostart_sessions;
                if auto_started {
                    s.enter(ActivePhase::Studying, now);
                    debug!(profile = %profile.name, "break complete, next study phase started");
                } else {
                    s.reset();
                    info!(profile = %profile.name, "break complete, run ended");
                }
                SessionEvent::BreakComplete { auto_started }
            }
        };
        self.sink.notify(&event, profile);
        Ok(Some(event))
    }

    /// Freeze the running phase.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless studying or breaking.
    pub fn pause(&mut self, now: Instant) -> Result<(), SessionError> {
        let from = match self.session.phase {
            Phase::Studying => ActivePhase::Studying,
            Phase::Breaking => ActivePhase::Breaking,
            phase => {
                return Err(SessionError::InvalidTransition {
                    operation: "pause",
                    phase,
                })
            }
        };
        self.session.suspend(from, now);
        debug!(?from, "paused");
        Ok(())
    }

    /// Return to the phase that was paused. Returns how long the pause lasted.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless paused.
    pub fn resume(&mut self, now: Instant) -> Result<Duration, SessionError> {
        let Phase::Paused(from) = self.session.phase else {
            return Err(SessionError::InvalidTransition {
                operation: "resume",
                phase: self.session.phase,
            });
        };
        let paused_for = self.session.unsuspend(from, now);
        debug!(?from, paused_secs = paused_for.as_secs(), "resumed");
        Ok(paused_for)
    }

    /// Pause a running phase or resume a paused one.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` while idle.
    pub fn toggle_pause(&mut self, now: Instant) -> Result<Outcome, SessionError> {
        if self.session.phase.is_paused() {
            self.resume(now).map(|paused_for| Outcome::Resumed { paused_for })
        } else {
            self.pause(now).map(|()| Outcome::Paused)
        }
    }

    /// End the run, crediting the study time accrued so far.
    ///
    /// A study phase that had already reached its target without being
    /// counted is counted here; phases counted by `tick()` never are. Always
    /// safe to call: returns `None` and changes nothing while idle.
    pub fn stop(&mut self, store: &mut ProfileStore, now: Instant) -> Option<StopSummary> {
        let phase = self.session.phase;
        let active = phase.active()?;
        let index = self.session.profile_index;
        let mut summary = StopSummary {
            profile_index: index,
            credited_study_seconds: 0,
            counted_completion: false,
        };

        match store.get_mut(index) {
            Some(profile) => {
                if active == ActivePhase::Studying {
                    let studied = self.session.elapsed_study_seconds;
                    profile.total_study_time = profile.total_study_time.saturating_add(studied);
                    summary.credited_study_seconds = studied;
                    if studied >= profile.study_secs() {
                        profile.completed_sessions = profile.completed_sessions.saturating_add(1);
                        summary.counted_completion = true;
                    }
                }
                info!(
                    profile = %profile.name,
                    credited_secs = summary.credited_study_seconds,
                    "run stopped"
                );
            }
            None => warn!(index, "stopping run whose profile no longer exists"),
        }

        if let Some(anchor) = self.session.pause_anchor {
            debug!(
                paused_secs = now.saturating_duration_since(anchor).as_secs(),
                "stopped while paused"
            );
        }
        self.session.reset();
        Some(summary)
    }

    /// Change the active profile.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless idle, `ProfileNotFound` for a bad index.
    /// The active selection is unchanged on error.
    pub fn switch_profile(
        &mut self,
        store: &mut ProfileStore,
        new_index: usize,
    ) -> Result<(), SessionError> {
        self.require_idle("switch profile")?;
        let len = store.len();
        store
            .set_active(new_index)
            .map_err(|_| SessionError::ProfileNotFound {
                index: new_index,
                len,
            })?;
        self.session.profile_index = new_index;
        debug!(index = new_index, "active profile switched");
        Ok(())
    }

    /// Run one [`Command`].
    ///
    /// # Errors
    ///
    /// Whatever the underlying command rejects with.
    pub fn apply(
        &mut self,
        command: Command,
        store: &mut ProfileStore,
        settings: &GlobalSettings,
        now: Instant,
    ) -> Result<Outcome, SessionError> {
        match command {
            Command::Start {
                profile_index,
                subject,
            } => {
                let index = profile_index.unwrap_or_else(|| store.active_index());
                self.start(store, index, subject, now).map(|()| Outcome::Started)
            }
            Command::Tick => self.tick(store, settings, now).map(Outcome::Ticked),
            Command::Pause => self.pause(now).map(|()| Outcome::Paused),
            Command::Resume => self
                .resume(now)
                .map(|paused_for| Outcome::Resumed { paused_for }),
            Command::TogglePause => self.toggle_pause(now),
            Command::Stop => Ok(Outcome::Stopped(self.stop(store, now))),
            Command::SwitchProfile { index } => self
                .switch_profile(store, index)
                .map(|()| Outcome::ProfileSwitched(index)),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_idle(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.session.phase.is_idle() {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                phase: self.session.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingSink;
    use crate::profile::Profile;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn setup(profile: Profile) -> (SessionEngine<RecordingSink>, ProfileStore, GlobalSettings) {
        let store = ProfileStore::from_parts(vec![profile], 0, 20);
        (
            SessionEngine::with_sink(RecordingSink::new()),
            store,
            GlobalSettings::default(),
        )
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, mut store, _) = setup(Profile::default());
        let t0 = Instant::now();
        assert_eq!(engine.phase(), Phase::Idle);

        engine.start(&mut store, 0, "Maths", t0).unwrap();
        assert_eq!(engine.phase(), Phase::Studying);
        assert_eq!(engine.session().subject(), "Maths");
        assert_eq!(store.active().total_sessions, 1);

        engine.pause(t0 + secs(3)).unwrap();
        assert_eq!(engine.phase(), Phase::Paused(ActivePhase::Studying));
        assert_eq!(engine.session().pause_anchor(), Some(t0 + secs(3)));

        assert_eq!(engine.resume(t0 + secs(10)).unwrap(), secs(7));
        assert_eq!(engine.phase(), Phase::Studying);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let (mut engine, mut store, _) = setup(Profile::default());
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        let err = engine.start(&mut store, 0, "", t0).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                operation: "start",
                phase: Phase::Studying
            }
        );
        assert_eq!(store.active().total_sessions, 1);
    }

    #[test]
    fn start_with_bad_index_changes_nothing() {
        let (mut engine, mut store, _) = setup(Profile::default());
        let err = engine.start(&mut store, 3, "", Instant::now()).unwrap_err();
        assert_eq!(err, SessionError::ProfileNotFound { index: 3, len: 1 });
        assert!(engine.is_idle());
    }

    #[test]
    fn pause_and_resume_reject_wrong_phase() {
        let (mut engine, mut store, _) = setup(Profile::default());
        let t0 = Instant::now();
        assert!(engine.pause(t0).is_err());
        assert!(engine.resume(t0).is_err());
        engine.start(&mut store, 0, "", t0).unwrap();
        assert!(engine.resume(t0).is_err());
        engine.pause(t0).unwrap();
        assert!(engine.pause(t0).is_err());
    }

    #[test]
    fn tick_is_noop_while_paused() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(5)).unwrap();
        engine.pause(t0 + secs(5)).unwrap();
        assert_eq!(engine.tick(&mut store, &settings, t0 + secs(500)).unwrap(), None);
        assert_eq!(engine.session().elapsed_study_seconds(), 5);
    }

    #[test]
    fn missed_ticks_are_caught_up() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(42)).unwrap();
        assert_eq!(engine.session().elapsed_study_seconds(), 42);
    }

    #[test]
    fn study_completion_enters_break_and_notifies() {
        let (mut engine, mut store, settings) = setup(Profile::new("Quick", 1, 1, 5, 2));
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();

        let event = engine.tick(&mut store, &settings, t0 + secs(60)).unwrap();
        assert_eq!(
            event,
            Some(SessionEvent::StudyPhaseComplete {
                is_long_break: false,
                break_minutes: 1
            })
        );
        assert_eq!(engine.phase(), Phase::Breaking);
        assert_eq!(engine.session().elapsed_study_seconds(), 0);
        assert_eq!(store.active().completed_sessions, 1);
        assert_eq!(store.active().total_study_time, 60);
        assert_eq!(engine.sink().events(), vec![event.unwrap()]);
    }

    #[test]
    fn break_completion_without_autostart_returns_to_idle() {
        let (mut engine, mut store, settings) = setup(Profile::new("Quick", 1, 1, 5, 2));
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(60)).unwrap();
        let event = engine.tick(&mut store, &settings, t0 + secs(120)).unwrap();
        assert_eq!(event, Some(SessionEvent::BreakComplete { auto_started: false }));
        assert!(engine.is_idle());
        assert_eq!(engine.session().completed_study_phases_this_run(), 0);
    }

    #[test]
    fn break_completion_with_autostart_keeps_run_going() {
        let (mut engine, mut store, mut settings) = setup(Profile::new("Quick", 1, 1, 5, 2));
        settings.autostart_sessions = true;
        let t0 = Instant::now();
        engine.start(&mut store, 0, "Chem", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(60)).unwrap();
        let event = engine.tick(&mut store, &settings, t0 + secs(120)).unwrap();
        assert_eq!(event, Some(SessionEvent::BreakComplete { auto_started: true }));
        assert_eq!(engine.phase(), Phase::Studying);
        assert_eq!(engine.session().completed_study_phases_this_run(), 1);
        assert_eq!(engine.session().subject(), "Chem");
        assert_eq!(store.active().total_sessions, 1);

        let event = engine.tick(&mut store, &settings, t0 + secs(180)).unwrap();
        assert_eq!(
            event,
            Some(SessionEvent::StudyPhaseComplete {
                is_long_break: true,
                break_minutes: 5
            })
        );
    }

    #[test]
    fn stop_credits_partial_study_time() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(100)).unwrap();

        let summary = engine.stop(&mut store, t0 + secs(100)).unwrap();
        assert_eq!(summary.credited_study_seconds, 100);
        assert!(!summary.counted_completion);
        assert_eq!(store.active().total_study_time, 100);
        assert_eq!(store.active().completed_sessions, 0);
        assert!(engine.is_idle());
        assert_eq!(engine.session().elapsed_study_seconds(), 0);
    }

    #[test]
    fn stop_counts_completion_once_target_is_reached() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(600)).unwrap();

        // Shortening the study phase behind the engine's back leaves the
        // accrued 600 s past the new 300 s target.
        let mut shorter = store.active().clone();
        shorter.study_minutes = 5;
        store.update_profile(0, shorter).unwrap();
        engine.pause(t0 + secs(600)).unwrap();

        let summary = engine.stop(&mut store, t0 + secs(620)).unwrap();
        assert_eq!(summary.credited_study_seconds, 600);
        assert!(summary.counted_completion);
        assert_eq!(store.active().completed_sessions, 1);
        assert_eq!(store.active().total_study_time, 600);
        assert!(engine.is_idle());
    }

    #[test]
    fn stop_one_second_short_counts_no_completion() {
        let (mut engine, mut store, settings) = setup(Profile::new("Short", 5, 1, 5, 4));
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        assert_eq!(engine.tick(&mut store, &settings, t0 + secs(299)).unwrap(), None);

        let summary = engine.stop(&mut store, t0 + secs(299)).unwrap();
        assert_eq!(summary.credited_study_seconds, 299);
        assert!(!summary.counted_completion);
        assert_eq!(store.active().completed_sessions, 0);
        assert_eq!(store.active().total_study_time, 299);
    }

    #[test]
    fn stop_during_break_does_not_recount() {
        let (mut engine, mut store, settings) = setup(Profile::new("Quick", 1, 1, 5, 2));
        let t0 = Instant::now();
        engine.start(&mut store, 0, "", t0).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(60)).unwrap();
        engine.tick(&mut store, &settings, t0 + secs(90)).unwrap();

        let summary = engine.stop(&mut store, t0 + secs(90)).unwrap();
        assert_eq!(summary.credited_study_seconds, 0);
        assert_eq!(store.active().completed_sessions, 1);
        assert_eq!(store.active().total_study_time, 60);
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let (mut engine, mut store, _) = setup(Profile::default());
        assert_eq!(engine.stop(&mut store, Instant::now()), None);
        assert_eq!(store.active().total_study_time, 0);
    }

    #[test]
    fn switch_profile_only_while_idle() {
        let (mut engine, mut store, _) = setup(Profile::default());
        store.add_profile(Profile::new("Other", 50, 10, 20, 2)).unwrap();
        let t0 = Instant::now();

        engine.switch_profile(&mut store, 1).unwrap();
        assert_eq!(store.active_index(), 1);

        engine.start(&mut store, 1, "", t0).unwrap();
        let err = engine.switch_profile(&mut store, 0).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(store.active_index(), 1);
    }

    #[test]
    fn tick_with_missing_profile_is_an_error() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        store.add_profile(Profile::new("Other", 50, 10, 20, 2)).unwrap();
        let t0 = Instant::now();
        engine.start(&mut store, 1, "", t0).unwrap();
        store.remove_profile(1).unwrap();

        let err = engine.tick(&mut store, &settings, t0 + secs(1)).unwrap_err();
        assert_eq!(err, SessionError::ProfileNotFound { index: 1, len: 1 });
        assert_eq!(engine.phase(), Phase::Studying);
    }

    #[test]
    fn apply_dispatches_commands() {
        let (mut engine, mut store, settings) = setup(Profile::default());
        let t0 = Instant::now();
        let start = Command::Start {
            profile_index: None,
            subject: "History".into(),
        };
        assert_eq!(
            engine.apply(start, &mut store, &settings, t0).unwrap(),
            Outcome::Started
        );
        assert_eq!(
            engine
                .apply(Command::TogglePause, &mut store, &settings, t0)
                .unwrap(),
            Outcome::Paused
        );
        assert_eq!(
            engine
                .apply(Command::TogglePause, &mut store, &settings, t0 + secs(4))
                .unwrap(),
            Outcome::Resumed { paused_for: secs(4) }
        );
        assert!(matches!(
            engine.apply(Command::Stop, &mut store, &settings, t0).unwrap(),
            Outcome::Stopped(Some(_))
        ));
        assert!(engine.apply(Command::TogglePause, &mut store, &settings, t0).is_err());
    }
}

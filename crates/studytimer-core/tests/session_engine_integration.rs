//! Integration tests for the session engine.
//!
//! Drives full runs tick by tick and checks phase transitions, statistics
//! and long-break cadence.

use std::time::{Duration, Instant};

use studytimer_core::timer::ActivePhase;
use studytimer_core::{
    GlobalSettings, Phase, Profile, ProfileStore, RecordingSink, SessionEngine, SessionError,
    SessionEvent,
};

struct Rig {
    engine: SessionEngine<RecordingSink>,
    store: ProfileStore,
    settings: GlobalSettings,
    t0: Instant,
    now: Instant,
}

impl Rig {
    fn new(profile: Profile) -> Self {
        let t0 = Instant::now();
        Self {
            engine: SessionEngine::with_sink(RecordingSink::new()),
            store: ProfileStore::from_parts(vec![profile], 0, 20),
            settings: GlobalSettings::default(),
            t0,
            now: t0,
        }
    }

    fn start(&mut self) {
        self.engine
            .start(&mut self.store, 0, "Linear algebra", self.now)
            .unwrap();
    }

    /// Tick `n` times, one second apart; returns the events emitted.
    fn ticks(&mut self, n: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            self.now += Duration::from_secs(1);
            if let Some(e) = self
                .engine
                .tick(&mut self.store, &self.settings, self.now)
                .unwrap()
            {
                events.push(e);
            }
        }
        events
    }

    fn profile(&self) -> &Profile {
        self.store.get(0).unwrap()
    }
}

fn pomodoro() -> Profile {
    Profile::new("Pomodoro", 25, 5, 15, 4)
}

#[test]
fn full_study_phase_moves_to_break() {
    for minutes in [1u32, 25, 50] {
        let mut rig = Rig::new(Profile::new("p", minutes, 5, 15, 4));
        rig.start();
        let events = rig.ticks(u64::from(minutes) * 60);

        assert_eq!(rig.engine.phase(), Phase::Breaking);
        assert_eq!(rig.engine.session().elapsed_study_seconds(), 0);
        assert_eq!(rig.profile().completed_sessions, 1);
        assert_eq!(rig.profile().total_study_time, u64::from(minutes) * 60);
        assert_eq!(events.len(), 1);
    }
}

#[test]
fn one_tick_short_stays_studying() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    assert!(rig.ticks(1499).is_empty());
    assert_eq!(rig.engine.phase(), Phase::Studying);
    assert_eq!(rig.engine.session().elapsed_study_seconds(), 1499);
    assert_eq!(rig.profile().completed_sessions, 0);
}

#[test]
fn pomodoro_single_cycle_without_autostart() {
    let mut rig = Rig::new(pomodoro());
    rig.start();

    let events = rig.ticks(1500);
    assert_eq!(
        events,
        vec![SessionEvent::StudyPhaseComplete {
            is_long_break: false,
            break_minutes: 5
        }]
    );
    assert!(!rig.engine.session().is_long_break());

    let events = rig.ticks(300);
    assert_eq!(events, vec![SessionEvent::BreakComplete { auto_started: false }]);
    assert_eq!(rig.engine.phase(), Phase::Idle);
    assert_eq!(rig.engine.session().completed_study_phases_this_run(), 0);
    assert_eq!(rig.profile().total_sessions, 1);
    assert_eq!(rig.profile().completed_sessions, 1);
    assert_eq!(rig.profile().total_study_time, 1500);
}

#[test]
fn fourth_break_is_long_with_autostart() {
    let mut rig = Rig::new(pomodoro());
    rig.settings.autostart_sessions = true;
    rig.start();

    let mut study_events = Vec::new();
    for cycle in 1..=4u32 {
        study_events.extend(rig.ticks(1500));
        assert_eq!(rig.engine.phase(), Phase::Breaking);
        let break_secs = if cycle == 4 { 900 } else { 300 };
        let events = rig.ticks(break_secs);
        assert_eq!(events, vec![SessionEvent::BreakComplete { auto_started: true }]);
    }

    assert_eq!(
        study_events,
        vec![
            SessionEvent::StudyPhaseComplete { is_long_break: false, break_minutes: 5 },
            SessionEvent::StudyPhaseComplete { is_long_break: false, break_minutes: 5 },
            SessionEvent::StudyPhaseComplete { is_long_break: false, break_minutes: 5 },
            SessionEvent::StudyPhaseComplete { is_long_break: true, break_minutes: 15 },
        ]
    );
    assert_eq!(rig.engine.session().completed_study_phases_this_run(), 4);
    assert_eq!(rig.profile().completed_sessions, 4);
    assert_eq!(rig.profile().total_sessions, 1);
    assert_eq!(rig.engine.sink().events().len(), 8);
}

#[test]
fn long_break_lasts_long_break_minutes() {
    let mut rig = Rig::new(Profile::new("p", 1, 1, 5, 1));
    rig.start();
    rig.ticks(60);
    assert!(rig.engine.session().is_long_break());
    assert!(rig.ticks(299).is_empty());
    assert_eq!(rig.engine.phase(), Phase::Breaking);
    assert_eq!(rig.ticks(1).len(), 1);
    assert!(rig.engine.is_idle());
}

#[test]
fn cadence_restarts_each_run() {
    let mut rig = Rig::new(Profile::new("p", 1, 1, 5, 2));
    rig.start();
    rig.ticks(60);
    assert!(!rig.engine.session().is_long_break());
    rig.ticks(60);
    assert!(rig.engine.is_idle());

    // Lifetime completions are 1, but the new run starts counting from zero.
    rig.start();
    rig.ticks(60);
    assert!(!rig.engine.session().is_long_break());
    assert_eq!(rig.profile().completed_sessions, 2);
}

#[test]
fn pause_resume_preserves_counters_and_phase() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    rig.ticks(100);

    rig.engine.pause(rig.now).unwrap();
    assert_eq!(rig.engine.phase(), Phase::Paused(ActivePhase::Studying));
    rig.engine.resume(rig.now).unwrap();
    assert_eq!(rig.engine.phase(), Phase::Studying);
    assert_eq!(rig.engine.session().elapsed_study_seconds(), 100);

    rig.ticks(1400);
    rig.ticks(10);
    rig.engine.pause(rig.now).unwrap();
    assert_eq!(rig.engine.phase(), Phase::Paused(ActivePhase::Breaking));
    rig.engine.resume(rig.now).unwrap();
    assert_eq!(rig.engine.phase(), Phase::Breaking);
    assert_eq!(rig.engine.session().elapsed_break_seconds(), 10);
}

#[test]
fn paused_wall_time_is_excluded() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    rig.ticks(60);
    rig.engine.pause(rig.now).unwrap();

    rig.now += Duration::from_secs(3600);
    rig.engine.resume(rig.now).unwrap();
    rig.ticks(1);
    assert_eq!(rig.engine.session().elapsed_study_seconds(), 61);
}

#[test]
fn stop_mid_study_credits_accrued_time_only() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    rig.ticks(777);
    let summary = rig.engine.stop(&mut rig.store, rig.now).unwrap();

    assert_eq!(summary.credited_study_seconds, 777);
    assert!(!summary.counted_completion);
    assert_eq!(rig.profile().total_study_time, 777);
    assert_eq!(rig.profile().completed_sessions, 0);
    assert!(rig.engine.is_idle());
}

#[test]
fn stop_while_paused_credits_study_time() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    rig.ticks(200);
    rig.engine.pause(rig.now).unwrap();
    let summary = rig.engine.stop(&mut rig.store, rig.now).unwrap();
    assert_eq!(summary.credited_study_seconds, 200);
    assert_eq!(rig.profile().total_study_time, 200);
}

#[test]
fn stop_twice_does_not_double_count() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    rig.ticks(1500);
    rig.ticks(30);

    assert!(rig.engine.stop(&mut rig.store, rig.now).is_some());
    let after_first = rig.profile().clone();
    assert!(rig.engine.stop(&mut rig.store, rig.now).is_none());
    assert_eq!(rig.profile(), &after_first);
    assert_eq!(after_first.completed_sessions, 1);
    assert_eq!(after_first.total_study_time, 1500);
}

#[test]
fn switch_profile_while_running_is_rejected() {
    let mut rig = Rig::new(pomodoro());
    rig.store
        .add_profile(Profile::new("Deep Work", 90, 20, 30, 2))
        .unwrap();
    rig.start();

    for phase_ticks in [0u64, 1500] {
        rig.ticks(phase_ticks);
        let err = rig.engine.switch_profile(&mut rig.store, 1).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(rig.store.active_index(), 0);
    }

    rig.engine.pause(rig.now).unwrap();
    assert!(rig.engine.switch_profile(&mut rig.store, 1).is_err());
    rig.engine.stop(&mut rig.store, rig.now);
    rig.engine.switch_profile(&mut rig.store, 1).unwrap();
    assert_eq!(rig.store.active_index(), 1);
}

#[test]
fn irregular_ticks_accumulate_real_time() {
    let mut rig = Rig::new(pomodoro());
    rig.start();
    for ms in [400u64, 900, 1700, 3000, 250] {
        rig.now += Duration::from_millis(ms);
        rig.engine
            .tick(&mut rig.store, &rig.settings, rig.now)
            .unwrap();
    }
    // 6.25 s of wall time.
    assert_eq!(rig.engine.session().elapsed_study_seconds(), 6);
    assert_eq!(rig.now - rig.t0, Duration::from_millis(6250));
}

//! The host object that owns one engine and everything it works on.
//!
//! [`StudyTimer`] replaces a process-wide app singleton: a UI keeps one of
//! these, maps its events onto [`Command`]s and renders
//! [`StudyTimer::snapshot`]. It takes care of loading with fallback,
//! persisting after anything that changed statistics or configuration,
//! and refusing profile edits while a run is active.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, PersistenceError, ProfileError, SessionError};
use crate::history::{RunRecord, RunTracker};
use crate::notify::NotificationSink;
use crate::profile::{Profile, ProfileStore, MAX_PROFILES};
use crate::storage::{GlobalSettings, PersistenceGateway};
use crate::timer::{Command, Outcome, SessionEngine, SessionSnapshot, StopSummary};

pub struct StudyTimer<G, N> {
    settings: GlobalSettings,
    store: ProfileStore,
    engine: SessionEngine<N>,
    gateway: G,
    clock: Box<dyn Clock>,
    persist_error: Option<PersistenceError>,
    run: Option<RunTracker>,
}

impl<G: PersistenceGateway, N: NotificationSink> StudyTimer<G, N> {
    /// Load state through `gateway`, falling back to built-in defaults when
    /// nothing usable is stored.
    pub fn open(gateway: G, sink: N) -> Self {
        Self::open_with_capacity(gateway, sink, MAX_PROFILES)
    }

    pub fn open_with_capacity(gateway: G, sink: N, capacity: usize) -> Self {
        let (mut settings, profiles) = match gateway.load() {
            Ok(loaded) => loaded,
            Err(PersistenceError::NotFound { path }) => {
                debug!(path = %path.display(), "no saved state, using defaults");
                (GlobalSettings::default(), Vec::new())
            }
            Err(e) => {
                warn!(error = %e, "failed to load saved state, using defaults");
                (GlobalSettings::default(), Vec::new())
            }
        };
        if let Err(e) = settings.validate() {
            warn!(error = %e, "repairing loaded settings");
            settings.sound_volume = settings.sound_volume.min(100);
        }
        let store = ProfileStore::from_parts(profiles, settings.active_profile_index, capacity);
        settings.active_profile_index = store.active_index();

        Self {
            settings,
            store,
            engine: SessionEngine::with_sink(sink),
            gateway,
            clock: Box::new(SystemClock),
            persist_error: None,
            run: None,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn engine(&self) -> &SessionEngine<N> {
        &self.engine
    }

    pub fn sink_mut(&mut self) -> &mut N {
        self.engine.sink_mut()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.engine.snapshot(&self.store)
    }

    /// Every recorded run, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the gateway's failure.
    pub fn history(&self) -> Result<Vec<RunRecord>, PersistenceError> {
        self.gateway.load_history()
    }

    /// The most recent persistence failure, if any, clearing it.
    pub fn take_persist_error(&mut self) -> Option<PersistenceError> {
        self.persist_error.take()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply `command` at the clock's current reading.
    ///
    /// State is saved whenever the outcome changed statistics or the
    /// active profile, and a run that ends is appended to the history. A
    /// failed save never fails the command; it is logged
    /// and kept for [`take_persist_error`](Self::take_persist_error).
    ///
    /// # Errors
    ///
    /// Whatever the engine rejects the command with.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let now = self.clock.now();
        let subject = match &command {
            Command::Start { subject, .. } => Some(subject.clone()),
            _ => None,
        };
        let outcome = self
            .engine
            .apply(command, &mut self.store, &self.settings, now)?;
        if let Some(subject) = subject {
            let index = self.store.active_index();
            let profile = self.store.active();
            self.run = Some(RunTracker::begin(index, profile, subject.as_str(), Utc::now()));
            self.settings.last_subject = subject;
        }
        if outcome.touched_statistics() {
            self.settings.active_profile_index = self.store.active_index();
            self.persist();
        }
        if self.engine.is_idle() {
            self.record_run(matches!(outcome, Outcome::Stopped(_)));
        }
        Ok(outcome)
    }

    /// Start a run on the active profile.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless idle.
    pub fn start(&mut self, subject: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(Command::Start {
            profile_index: None,
            subject: subject.into(),
        })
        .map(|_| ())
    }

    /// Stop any active run and save. Safe to call at any time.
    pub fn stop(&mut self) -> Option<StopSummary> {
        match self.dispatch(Command::Stop) {
            Ok(Outcome::Stopped(summary)) => summary,
            _ => None,
        }
    }

    /// Stop any active run and save, for application exit.
    ///
    /// # Errors
    ///
    /// Returns the save failure, if any.
    pub fn shutdown(mut self) -> Result<Option<StopSummary>, PersistenceError> {
        let summary = self.stop();
        self.persist_error = None;
        self.save()?;
        Ok(summary)
    }

    // ── Profiles & settings ──────────────────────────────────────────

    /// # Errors
    ///
    /// `Session` while a run is active, `Profile` if the store rejects it.
    pub fn add_profile(&mut self, profile: Profile) -> Result<usize, CoreError> {
        self.require_idle("add profile")?;
        let index = self.store.add_profile(profile)?;
        self.persist();
        Ok(index)
    }

    /// # Errors
    ///
    /// `Session` while a run is active, `Profile` if the store rejects it.
    pub fn remove_profile(&mut self, index: usize) -> Result<Profile, CoreError> {
        self.require_idle("remove profile")?;
        let removed = self.store.remove_profile(index)?;
        self.settings.active_profile_index = self.store.active_index();
        self.persist();
        Ok(removed)
    }

    /// Change the configurable fields of a profile, keeping its statistics.
    ///
    /// # Errors
    ///
    /// `Session` while a run is active, `Profile` if the store rejects it.
    pub fn edit_profile(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut Profile),
    ) -> Result<(), CoreError> {
        self.require_idle("edit profile")?;
        let mut edited = self
            .store
            .get(index)
            .cloned()
            .ok_or(ProfileError::OutOfBounds {
                index,
                len: self.store.len(),
            })?;
        edit(&mut edited);
        self.store.update_profile(index, edited)?;
        self.persist();
        Ok(())
    }

    /// # Errors
    ///
    /// `InvalidTransition` while a run is active, `ProfileNotFound` for a
    /// bad index.
    pub fn switch_profile(&mut self, index: usize) -> Result<(), SessionError> {
        self.dispatch(Command::SwitchProfile { index }).map(|_| ())
    }

    /// Change settings through `edit`; rejected edits leave them untouched.
    ///
    /// # Errors
    ///
    /// `Validation` if the edited settings are out of range.
    pub fn update_settings(
        &mut self,
        edit: impl FnOnce(&mut GlobalSettings),
    ) -> Result<(), CoreError> {
        let mut edited = self.settings.clone();
        edit(&mut edited);
        edited.validate()?;
        edited.active_profile_index = self.store.active_index();
        self.settings = edited;
        self.persist();
        Ok(())
    }

    /// Write the current state through the gateway.
    ///
    /// # Errors
    ///
    /// Returns the gateway's failure.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        self.settings.active_profile_index = self.store.active_index();
        self.gateway.save(&self.settings, self.store.profiles())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn record_run(&mut self, stopped: bool) {
        let Some(tracker) = self.run.take() else {
            return;
        };
        let Some(profile) = self.store.get(tracker.profile_index) else {
            warn!(index = tracker.profile_index, "finished run's profile no longer exists");
            return;
        };
        let record = tracker.finish(profile, stopped, Utc::now());
        debug!(subject = %record.subject, study_secs = record.study_seconds, "run recorded");
        if let Err(e) = self.gateway.append_run(&record) {
            warn!(error = %e, "failed to record run");
            self.persist_error = Some(e);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to save state");
            self.persist_error = Some(e);
        }
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.engine.is_idle() {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                phase: self.engine.phase(),
            })
        }
    }
}

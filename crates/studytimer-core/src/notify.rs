//! Notification sinks.
//!
//! The engine reports phase boundaries to a [`NotificationSink`] together
//! with the profile they happened on, so a sink can honour the profile's
//! `sound_enabled` / `notifications_enabled` hints.

use tracing::info;

use crate::events::SessionEvent;
use crate::profile::Profile;

/// Receiver for phase-boundary events.
pub trait NotificationSink {
    fn notify(&mut self, event: &SessionEvent, profile: &Profile);
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: &SessionEvent, profile: &Profile) {
        match event {
            SessionEvent::StudyPhaseComplete {
                is_long_break,
                break_minutes,
            } => info!(
                profile = %profile.name,
                is_long_break,
                break_minutes,
                "study phase complete"
            ),
            SessionEvent::BreakComplete { auto_started } => {
                info!(profile = %profile.name, auto_started, "break complete")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _event: &SessionEvent, _profile: &Profile) {}
}

/// Keeps every event it receives, tagged with the profile name.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<(SessionEvent, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events only, in arrival order.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.iter().map(|(e, _)| *e).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, event: &SessionEvent, profile: &Profile) {
        self.events.push((*event, profile.name.clone()));
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn notify(&mut self, event: &SessionEvent, profile: &Profile) {
        (**self).notify(event, profile);
    }
}

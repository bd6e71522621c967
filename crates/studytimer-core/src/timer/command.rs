use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::engine::StopSummary;
use crate::events::SessionEvent;

/// A request from the host's event loop.
///
/// Hosts map their own UI events (button presses, timer callbacks, key
/// bindings) onto these and feed them to `SessionEngine::apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Start a run; `None` uses the active profile.
    Start {
        #[serde(default)]
        profile_index: Option<usize>,
        #[serde(default)]
        subject: String,
    },
    Tick,
    Pause,
    Resume,
    /// Pause when running, resume when paused.
    TogglePause,
    Stop,
    SwitchProfile { index: usize },
}

/// Result of a successfully applied [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started,
    /// Tick result; `Some` when a phase boundary was crossed.
    Ticked(Option<SessionEvent>),
    Paused,
    Resumed { paused_for: Duration },
    /// `None` when there was no run to stop.
    Stopped(Option<StopSummary>),
    ProfileSwitched(usize),
}

impl Outcome {
    /// Whether the outcome changed profile statistics, i.e. something
    /// worth persisting.
    pub fn touched_statistics(&self) -> bool {
        matches!(
            self,
            Outcome::Started
                | Outcome::Ticked(Some(_))
                | Outcome::Stopped(Some(_))
                | Outcome::ProfileSwitched(_)
        )
    }
}

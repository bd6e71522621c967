use serde::{Deserialize, Serialize};

/// Phase-boundary events the engine hands to its notification sink.
///
/// Events carry structured data only; turning them into dialogs, sounds or
/// desktop notifications is the sink's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A study phase ran to its full length and a break has begun.
    StudyPhaseComplete {
        is_long_break: bool,
        break_minutes: u32,
    },
    /// A break ran out. `auto_started` is true when the next study phase
    /// began immediately, false when the run returned to idle.
    BreakComplete { auto_started: bool },
}

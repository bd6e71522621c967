use std::io::Write;

use studytimer_core::{NotificationSink, Profile, SessionEvent};

/// Announces phase boundaries on the terminal.
///
/// Messages honour the profile's `notifications_enabled` flag and the bell
/// honours `sound_enabled`. In JSON mode every event is printed to stdout
/// as one line instead.
pub struct TerminalSink {
    json: bool,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl NotificationSink for TerminalSink {
    fn notify(&mut self, event: &SessionEvent, profile: &Profile) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        if profile.notifications_enabled {
            let (title, body) = match event {
                SessionEvent::StudyPhaseComplete { break_minutes, .. } => (
                    "Study Complete",
                    format!("Study session complete! Take a {break_minutes} minute break."),
                ),
                SessionEvent::BreakComplete { .. } => (
                    "Break Complete",
                    "Ready for the next study session!".to_string(),
                ),
            };
            eprintln!("\n{title}: {body}");
        }
        if profile.sound_enabled {
            eprint!("\x07");
            let _ = std::io::stderr().flush();
        }
    }
}

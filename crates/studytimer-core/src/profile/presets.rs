//! Built-in profile presets.

use super::types::Profile;

/// A named starting point for a new profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Slug used to look the preset up (e.g. "deep-work").
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub study_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    pub sessions_until_long_break: u32,
}

impl Preset {
    /// Build a fresh profile from this preset.
    pub fn to_profile(&self) -> Profile {
        Profile::new(
            self.name,
            self.study_minutes,
            self.break_minutes,
            self.long_break_minutes,
            self.sessions_until_long_break,
        )
    }
}

const PRESETS: [Preset; 4] = [
    Preset {
        id: "default",
        name: "Default",
        description: "Classic 25/5 cycle with a long break every fourth session",
        study_minutes: 25,
        break_minutes: 5,
        long_break_minutes: 15,
        sessions_until_long_break: 4,
    },
    Preset {
        id: "pomodoro",
        name: "Pomodoro",
        description: "The textbook Pomodoro technique",
        study_minutes: 25,
        break_minutes: 5,
        long_break_minutes: 15,
        sessions_until_long_break: 4,
    },
    Preset {
        id: "deep-work",
        name: "Deep Work",
        description: "Long uninterrupted blocks for demanding material",
        study_minutes: 90,
        break_minutes: 20,
        long_break_minutes: 30,
        sessions_until_long_break: 2,
    },
    Preset {
        id: "short-sprint",
        name: "Short Sprint",
        description: "Quick bursts for review and flashcards",
        study_minutes: 15,
        break_minutes: 3,
        long_break_minutes: 10,
        sessions_until_long_break: 3,
    },
];

/// All built-in presets, in display order.
pub fn builtin_presets() -> &'static [Preset] {
    &PRESETS
}

/// Find a built-in preset by slug.
pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

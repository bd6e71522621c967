//! Study profiles and the store that holds them.
//!
//! - [`Profile`]: durations, cadence, alert toggles and lifetime statistics
//! - [`ProfileStore`]: ordered, capped list with an active selection
//! - [`builtin_presets`]: starting points for new profiles

mod presets;
mod store;
mod types;

pub use presets::{builtin_presets, find_preset, Preset};
pub use store::{ProfileStore, MAX_PROFILES};
pub use types::{Profile, BREAK_MINUTES, LONG_BREAK_MINUTES, NAME_LEN, STUDY_MINUTES};

//! Study profile management commands.
//!
//! Profiles can only be changed while no run is active; every command here
//! opens the saved state, applies one change and writes it back.

use std::path::Path;

use clap::Subcommand;
use studytimer_core::profile::{builtin_presets, find_preset};
use studytimer_core::Profile;

use super::{check_saved, open_quiet, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for one profile
    Show {
        /// Profile index (see `profile list`)
        index: usize,
    },

    /// Add a profile
    Add {
        /// Profile name
        name: String,
        /// Start from a built-in preset (see `profile presets`)
        #[arg(long)]
        preset: Option<String>,
        /// Study minutes (1-180)
        #[arg(long)]
        study: Option<u32>,
        /// Break minutes (1-60)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Long break minutes (5-120)
        #[arg(long)]
        long_break: Option<u32>,
        /// Study phases between long breaks
        #[arg(long)]
        every: Option<u32>,
        /// Disable the sound alert
        #[arg(long)]
        no_sound: bool,
        /// Disable notifications
        #[arg(long)]
        no_notifications: bool,
    },

    /// Edit a profile (statistics are kept)
    Edit {
        /// Profile index
        index: usize,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// Study minutes (1-180)
        #[arg(long)]
        study: Option<u32>,
        /// Break minutes (1-60)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Long break minutes (5-120)
        #[arg(long)]
        long_break: Option<u32>,
        /// Study phases between long breaks
        #[arg(long)]
        every: Option<u32>,
        /// Enable or disable the sound alert
        #[arg(long)]
        sound: Option<bool>,
        /// Enable or disable notifications
        #[arg(long)]
        notifications: Option<bool>,
    },

    /// Remove a profile
    Remove {
        /// Profile index
        index: usize,
    },

    /// Make a profile the active one
    Switch {
        /// Profile index
        index: usize,
    },

    /// List built-in presets
    Presets,
}

pub fn run(action: ProfileAction, data_dir: Option<&Path>) -> CliResult {
    match action {
        ProfileAction::List { json } => list_profiles(data_dir, json),
        ProfileAction::Show { index } => show_profile(data_dir, index),
        ProfileAction::Add {
            name,
            preset,
            study,
            break_minutes,
            long_break,
            every,
            no_sound,
            no_notifications,
        } => {
            let mut profile = match preset {
                Some(id) => find_preset(&id)
                    .ok_or_else(|| format!("Preset '{id}' not found"))?
                    .to_profile(),
                None => Profile::default(),
            };
            profile.name = name;
            apply_fields(&mut profile, study, break_minutes, long_break, every);
            profile.sound_enabled = !no_sound;
            profile.notifications_enabled = !no_notifications;

            let mut timer = open_quiet(data_dir);
            let index = timer.add_profile(profile)?;
            check_saved(&mut timer)?;
            println!("added profile {index}");
            Ok(())
        }
        ProfileAction::Edit {
            index,
            name,
            study,
            break_minutes,
            long_break,
            every,
            sound,
            notifications,
        } => {
            let mut timer = open_quiet(data_dir);
            timer.edit_profile(index, |profile| {
                if let Some(name) = name {
                    profile.name = name;
                }
                apply_fields(profile, study, break_minutes, long_break, every);
                if let Some(sound) = sound {
                    profile.sound_enabled = sound;
                }
                if let Some(notifications) = notifications {
                    profile.notifications_enabled = notifications;
                }
            })?;
            check_saved(&mut timer)?;
            println!("updated profile {index}");
            Ok(())
        }
        ProfileAction::Remove { index } => {
            let mut timer = open_quiet(data_dir);
            let removed = timer.remove_profile(index)?;
            check_saved(&mut timer)?;
            println!("removed profile '{}'", removed.name);
            Ok(())
        }
        ProfileAction::Switch { index } => {
            let mut timer = open_quiet(data_dir);
            timer.switch_profile(index)?;
            check_saved(&mut timer)?;
            println!("active profile: {}", timer.store().active().name);
            Ok(())
        }
        ProfileAction::Presets => {
            println!("Built-in Presets:");
            println!();
            for preset in builtin_presets() {
                println!("  {} - {}", preset.id, preset.name);
                println!("    {}", preset.description);
                println!(
                    "    {}m study / {}m break / {}m long break every {}",
                    preset.study_minutes,
                    preset.break_minutes,
                    preset.long_break_minutes,
                    preset.sessions_until_long_break
                );
                println!();
            }
            Ok(())
        }
    }
}

fn apply_fields(
    profile: &mut Profile,
    study: Option<u32>,
    break_minutes: Option<u32>,
    long_break: Option<u32>,
    every: Option<u32>,
) {
    if let Some(v) = study {
        profile.study_minutes = v;
    }
    if let Some(v) = break_minutes {
        profile.break_minutes = v;
    }
    if let Some(v) = long_break {
        profile.long_break_minutes = v;
    }
    if let Some(v) = every {
        profile.sessions_until_long_break = v;
    }
}

fn list_profiles(data_dir: Option<&Path>, json: bool) -> CliResult {
    let timer = open_quiet(data_dir);
    let store = timer.store();

    if json {
        let value = serde_json::json!({
            "active": store.active_index(),
            "profiles": store.profiles(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Profiles ({}/{}):", store.len(), store.capacity());
    println!();
    for (index, profile) in store.profiles().iter().enumerate() {
        let active = if index == store.active_index() {
            " [ACTIVE]"
        } else {
            ""
        };
        println!(
            "  {index}: {} ({}/{}/{} min){active}",
            profile.name, profile.study_minutes, profile.break_minutes, profile.long_break_minutes
        );
    }
    Ok(())
}

fn show_profile(data_dir: Option<&Path>, index: usize) -> CliResult {
    let timer = open_quiet(data_dir);
    let store = timer.store();
    let profile = store
        .get(index)
        .ok_or_else(|| format!("Profile {index} not found (profiles: {})", store.len()))?;

    println!("{}", profile.name);
    println!("{}", "=".repeat(profile.name.chars().count()));
    println!();
    println!("Schedule:");
    println!("  Study: {} min", profile.study_minutes);
    println!("  Break: {} min", profile.break_minutes);
    println!("  Long Break: {} min", profile.long_break_minutes);
    println!("  Study phases before Long Break: {}", profile.sessions_until_long_break);
    println!();
    println!("Alerts:");
    println!("  Sound: {}", profile.sound_enabled);
    println!("  Notifications: {}", profile.notifications_enabled);
    println!();
    let (hours, minutes) = profile.study_time_hm();
    println!("Statistics:");
    println!("  Total Time: {hours}h {minutes}m");
    println!(
        "  Sessions: {} completed / {} total",
        profile.completed_sessions, profile.total_sessions
    );
    Ok(())
}

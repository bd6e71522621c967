use std::path::Path;

use clap::Subcommand;
use studytimer_core::{ConfigError, GlobalSettings};

use super::{check_saved, open_quiet, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "theme", "sound_volume", "window.x")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset settings to defaults (profiles are kept)
    Reset,
}

pub fn run(action: ConfigAction, data_dir: Option<&Path>) -> CliResult {
    let mut timer = open_quiet(data_dir);
    match action {
        ConfigAction::Get { key } => match timer.settings().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(ConfigError::UnknownKey(key).into()),
        },
        ConfigAction::Set { key, value } if key == "active_profile_index" => {
            // The active profile is owned by the profile list.
            let index = value.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                key,
                message: format!("'{value}' is not a profile index"),
            })?;
            timer.switch_profile(index)?;
            check_saved(&mut timer)?;
            println!("ok");
        }
        ConfigAction::Set { key, value } => {
            let mut outcome = Ok(());
            timer.update_settings(|settings| outcome = settings.set(&key, &value))?;
            outcome?;
            check_saved(&mut timer)?;
            println!("ok");
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(timer.settings())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            timer.update_settings(|settings| *settings = GlobalSettings::default())?;
            check_saved(&mut timer)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

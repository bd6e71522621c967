mod config;
mod gateway;

pub use config::{GlobalSettings, Theme, WindowGeometry};
pub use gateway::{
    MemoryGateway, PersistenceGateway, StoredState, TomlGateway, HISTORY_FILE,
    STATE_FILE,
};

use std::path::PathBuf;

/// Returns the directory the state file lives in.
///
/// `STUDYTIMER_DATA_DIR` wins when set. Otherwise `~/.config/studytimer`,
/// or `~/.config/studytimer-dev` when `STUDYTIMER_ENV=dev`. The directory is
/// not created here; saving creates it on demand.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("STUDYTIMER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("studytimer-dev")
    } else {
        base_dir.join("studytimer")
    }
}

//! Persistence boundary for settings and profiles.
//!
//! The engine knows nothing about files. Hosts load and save through a
//! [`PersistenceGateway`]; the bundled [`TomlGateway`] keeps everything in a
//! single TOML document:
//!
//! ```toml
//! [settings]
//! theme = "light"
//! autostart_sessions = false
//!
//! [[profiles]]
//! name = "Default"
//! study_minutes = 25
//! ```
//!
//! Run history is append-only and kept next to it in `history.jsonl`, one
//! JSON [`RunRecord`] per line.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::GlobalSettings;
use super::data_dir;
use crate::error::PersistenceError;
use crate::history::RunRecord;
use crate::profile::Profile;

/// File name used inside the data directory.
pub const STATE_FILE: &str = "studytimer.toml";

/// Run history file, a sibling of [`STATE_FILE`].
pub const HISTORY_FILE: &str = "history.jsonl";

/// Loads and saves global settings plus the profile list.
pub trait PersistenceGateway {
    /// # Errors
    ///
    /// `NotFound` when nothing has been saved yet, `LoadFailed` when stored
    /// data cannot be read or parsed.
    fn load(&self) -> Result<(GlobalSettings, Vec<Profile>), PersistenceError>;

    /// # Errors
    ///
    /// `SaveFailed` when the state cannot be written.
    fn save(
        &mut self,
        settings: &GlobalSettings,
        profiles: &[Profile],
    ) -> Result<(), PersistenceError>;

    /// Add one finished run to the history.
    ///
    /// # Errors
    ///
    /// `SaveFailed` when the record cannot be written.
    fn append_run(&mut self, record: &RunRecord) -> Result<(), PersistenceError>;

    /// All recorded runs, oldest first. Empty when nothing was recorded.
    ///
    /// # Errors
    ///
    /// `LoadFailed` when the history cannot be read.
    fn load_history(&self) -> Result<Vec<RunRecord>, PersistenceError>;
}

/// On-disk document layout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    pub settings: GlobalSettings,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Gateway backed by one TOML file.
#[derive(Debug, Clone)]
pub struct TomlGateway {
    path: PathBuf,
    history_path: PathBuf,
}

impl TomlGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history_path = path.with_file_name(HISTORY_FILE);
        Self { path, history_path }
    }

    /// `studytimer.toml` inside [`data_dir`].
    pub fn default_location() -> Self {
        Self::in_dir(data_dir())
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    fn load_failed(&self, message: impl ToString) -> PersistenceError {
        PersistenceError::LoadFailed {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn save_failed(&self, message: impl ToString) -> PersistenceError {
        PersistenceError::SaveFailed {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

impl PersistenceGateway for TomlGateway {
    fn load(&self) -> Result<(GlobalSettings, Vec<Profile>), PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(self.load_failed(e)),
        };
        let state: StoredState = toml::from_str(&content).map_err(|e| self.load_failed(e))?;
        Ok((state.settings, state.profiles))
    }

    fn save(
        &mut self,
        settings: &GlobalSettings,
        profiles: &[Profile],
    ) -> Result<(), PersistenceError> {
        let state = StoredState {
            settings: settings.clone(),
            profiles: profiles.to_vec(),
        };
        let content = toml::to_string_pretty(&state).map_err(|e| self.save_failed(e))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.save_failed(e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| self.save_failed(e))?;
        Ok(())
    }

    fn append_run(&mut self, record: &RunRecord) -> Result<(), PersistenceError> {
        let failed = |message: String| PersistenceError::SaveFailed {
            path: self.history_path.clone(),
            message,
        };
        let mut line = serde_json::to_string(record).map_err(|e| failed(e.to_string()))?;
        line.push('\n');
        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| failed(e.to_string()))
    }

    fn load_history(&self) -> Result<Vec<RunRecord>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.history_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PersistenceError::LoadFailed {
                    path: self.history_path.clone(),
                    message: e.to_string(),
                })
            }
        };

        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = number + 1, error = %e, "skipping unreadable history line"),
            }
        }
        Ok(records)
    }
}

/// Gateway that keeps state in memory, with switchable failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    pub state: Option<StoredState>,
    pub fail_load: bool,
    pub fail_save: bool,
    /// Number of successful saves.
    pub saves: usize,
    pub history: Vec<RunRecord>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(settings: GlobalSettings, profiles: Vec<Profile>) -> Self {
        Self {
            state: Some(StoredState { settings, profiles }),
            ..Self::default()
        }
    }
}

const MEMORY_PATH: &str = "<memory>";

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<(GlobalSettings, Vec<Profile>), PersistenceError> {
        if self.fail_load {
            return Err(PersistenceError::LoadFailed {
                path: MEMORY_PATH.into(),
                message: "simulated load failure".into(),
            });
        }
        self.state
            .clone()
            .map(|s| (s.settings, s.profiles))
            .ok_or_else(|| PersistenceError::NotFound {
                path: MEMORY_PATH.into(),
            })
    }

    fn save(
        &mut self,
        settings: &GlobalSettings,
        profiles: &[Profile],
    ) -> Result<(), PersistenceError> {
        if self.fail_save {
            return Err(PersistenceError::SaveFailed {
                path: MEMORY_PATH.into(),
                message: "simulated save failure".into(),
            });
        }
        self.state = Some(StoredState {
            settings: settings.clone(),
            profiles: profiles.to_vec(),
        });
        self.saves += 1;
        Ok(())
    }

    fn append_run(&mut self, record: &RunRecord) -> Result<(), PersistenceError> {
        if self.fail_save {
            return Err(PersistenceError::SaveFailed {
                path: MEMORY_PATH.into(),
                message: "simulated save failure".into(),
            });
        }
        self.history.push(record.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<RunRecord>, PersistenceError> {
        if self.fail_load {
            return Err(PersistenceError::LoadFailed {
                path: MEMORY_PATH.into(),
                message: "simulated load failure".into(),
            });
        }
        Ok(self.history.clone())
    }
}

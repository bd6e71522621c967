//! Global (non-profile) settings.
//!
//! Stores user preferences including:
//! - Theme and alert volume
//! - Tray and window behaviour
//! - Whether breaks roll straight into the next study phase
//! - The active profile and the last subject studied

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Last known main-window position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
}

/// Application-wide settings persisted next to the profile list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub theme: Theme,
    /// Alert volume, 0..=100.
    #[serde(default = "default_volume")]
    pub sound_volume: u32,
    #[serde(default = "default_true")]
    pub minimize_to_tray: bool,
    /// Start the next study phase as soon as a break ends.
    #[serde(default)]
    pub autostart_sessions: bool,
    #[serde(default)]
    pub active_profile_index: usize,
    #[serde(default)]
    pub last_subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowGeometry>,
}

fn default_volume() -> u32 {
    50
}
fn default_true() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sound_volume: default_volume(),
            minimize_to_tray: true,
            autostart_sessions: false,
            active_profile_index: 0,
            last_subject: String::new(),
            window: None,
        }
    }
}

impl GlobalSettings {
    /// # Errors
    ///
    /// Returns an error if the volume is above 100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sound_volume > 100 {
            return Err(ValidationError::invalid(
                "sound_volume",
                format!("{} is outside 0..=100", self.sound_volume),
            ));
        }
        Ok(())
    }

    /// Settings as JSON. An unset window reads as the default position when
    /// `key` addresses it, so `window.x` can be set before any geometry was
    /// stored.
    fn to_json_for(&self, key: &str) -> Result<serde_json::Value, serde_json::Error> {
        let mut json = serde_json::to_value(self)?;
        if self.window.is_none() && key.split('.').next() == Some("window") {
            let geometry = serde_json::to_value(WindowGeometry::default())?;
            if let Some(obj) = json.as_object_mut() {
                obj.insert("window".to_string(), geometry);
            }
        }
        Ok(json)
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("'{value}' is not true/false")))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<i64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("'{value}' is not a whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Get a setting as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = self.to_json_for(key).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a setting by dot-separated key, typed after the current value.
    ///
    /// Settings are unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's type, or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = self.to_json_for(key).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: GlobalSettings =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }
}

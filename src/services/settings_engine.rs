// shelfview Settings Engine
// Loads, saves and updates the view settings: server location, display defaults, log level.
// Settings live in a pretty-printed JSON file under the platform config directory.

use std::fs;
use std::io;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ViewSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ViewSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ViewSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine backed by a JSON file on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ViewSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// `path_override` replaces the default `<config dir>/settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ViewSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the settings file. A missing file yields defaults; a malformed
    /// one is an error.
    fn load(&mut self) -> Result<ViewSettings, SettingsError> {
        self.settings = match fs::read_to_string(&self.config_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SettingsError::SerializationError(format!("{}: {}", self.config_path, e))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.config_path, "no settings file, using defaults");
                ViewSettings::default()
            }
            Err(e) => {
                return Err(SettingsError::IoError(format!(
                    "cannot read {}: {}",
                    self.config_path, e
                )))
            }
        };
        Ok(self.settings.clone())
    }

    /// Writes the current settings, creating the config directory if needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                SettingsError::IoError(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            SettingsError::IoError(format!("cannot write {}: {}", self.config_path, e))
        })?;
        tracing::debug!(path = %self.config_path, "settings saved");
        Ok(())
    }

    fn get_settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Replaces one setting, or a whole section, addressed by a dot path
    /// such as `server.base_url`, then saves. Nothing changes when the
    /// result no longer deserializes into `ViewSettings`.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let segments: Vec<&str> = key.split('.').collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || s.contains(['/', '~']))
        {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        let slot = tree
            .pointer_mut(&format!("/{}", segments.join("/")))
            .ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;
        *slot = value;

        self.settings = serde_json::from_value(tree)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        tracing::info!(key, "setting changed");
        self.save()
    }

    /// Restores defaults and saves.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ViewSettings::default();
        tracing::info!(path = %self.config_path, "settings reset");
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

//! Settings persistence: load and save snapshot files.
//!
//! The engine itself never touches the filesystem; this thin manager is the
//! collaborator that does. It reads and writes a single settings file,
//! creating parent directories as needed. The encoding follows the file
//! extension: `.toml` is the structured-text form, anything else is JSON.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Format::Toml,
        _ => Format::Json,
    }
}

/// Loads and saves the persisted settings snapshot for one module.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsManager { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file.
    ///
    /// `Ok(None)` when the file does not exist yet — a module that has
    /// never been configured is not an error. Unparsable content is
    /// `CorruptSettings`.
    pub fn load(&self) -> Result<Option<Settings>, ConfigError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let settings = match format_for(&self.path) {
            Format::Json => Settings::from_json_bytes(&bytes)?,
            Format::Toml => {
                let text = std::str::from_utf8(&bytes).map_err(|e| {
                    ConfigError::CorruptSettings {
                        reason: e.to_string(),
                    }
                })?;
                Settings::from_toml_str(text)?
            }
        };
        debug!(path = %self.path.display(), "loaded settings");
        Ok(Some(settings))
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let bytes = match format_for(&self.path) {
            Format::Json => settings.to_json_bytes()?,
            Format::Toml => settings.to_toml_string()?.into_bytes(),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, &bytes).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot() -> Settings {
        Settings::from_map(
            serde_json::json!({
                "exampleBool": true,
                "server": {"port": 9000, "portMode": "localhost"}
            })
            .as_object()
            .unwrap()
            .clone(),
        )
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.json"));
        assert!(manager.load().unwrap().is_none());
    }

    #[test]
    fn json_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.json"));
        manager.save(&snapshot()).unwrap();
        assert_eq!(manager.load().unwrap().unwrap(), snapshot());
    }

    #[test]
    fn toml_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.toml"));
        manager.save(&snapshot()).unwrap();
        let content = fs::read_to_string(manager.path()).unwrap();
        assert!(content.contains("[server]"));
        assert_eq!(manager.load().unwrap().unwrap(), snapshot());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("sub").join("dir").join("s.json"));
        manager.save(&snapshot()).unwrap();
        assert!(manager.path().exists());
    }

    #[test]
    fn corrupt_file_is_corrupt_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{broken").unwrap();
        let manager = SettingsManager::new(&path);
        assert!(matches!(
            manager.load(),
            Err(ConfigError::CorruptSettings { .. })
        ));
    }

    #[test]
    fn unknown_extension_defaults_to_json() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.dat"));
        manager.save(&snapshot()).unwrap();
        let content = fs::read_to_string(manager.path()).unwrap();
        assert!(content.trim_start().starts_with('{'));
    }
}

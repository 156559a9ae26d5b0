//! Locally persisted user settings: the maps API key and the maps toggle.
//!
//! The store is a small JSON file. A missing file, or missing keys inside it,
//! mean "no key" and "maps disabled". There is no schema versioning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Minimum plausible length of a provider API key.
const MIN_API_KEY_LEN: usize = 25;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_api_key: Option<String>,
    #[serde(default)]
    pub enable_maps: bool,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("enable_maps", &self.enable_maps)
            .finish()
    }
}

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings file, returning defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsIo`] if the file exists but cannot be
    /// read, or [`ConfigError::SettingsParse`] if it is not valid JSON.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file; using defaults");
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(ConfigError::SettingsIo {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::SettingsParse {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Writes the settings file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsIo`] if the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(settings).map_err(|e| {
            ConfigError::SettingsParse {
                path: self.path.display().to_string(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, body).map_err(|e| ConfigError::SettingsIo {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

/// Picks the provider API key to use.
///
/// A persisted key wins; the environment-supplied key is used only when no
/// key has been persisted. Blank values count as absent.
#[must_use]
pub fn resolve_api_key(persisted: Option<&str>, env: Option<&str>) -> Option<String> {
    let non_blank = |s: &&str| !s.trim().is_empty();
    persisted
        .filter(non_blank)
        .or_else(|| env.filter(non_blank))
        .map(|s| s.trim().to_owned())
}

/// Cheap shape check run before any provider initialisation.
#[must_use]
pub fn is_probably_api_key(candidate: &str) -> bool {
    candidate.trim().len() >= MIN_API_KEY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let settings = store.load().expect("defaults");
        assert_eq!(settings, Settings::default());
        assert!(!settings.enable_maps);
        assert!(settings.google_maps_api_key.is_none());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let settings = Settings {
            google_maps_api_key: Some("AIzaSyExampleExampleExample123".to_string()),
            enable_maps: true,
        };
        store.save(&settings).expect("save");
        assert_eq!(store.load().expect("load"), settings);
    }

    #[test]
    fn absent_keys_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").expect("write");
        let settings = SettingsStore::new(&path).load().expect("load");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").expect("write");
        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::SettingsParse { .. }));
    }

    #[test]
    fn debug_redacts_key() {
        let settings = Settings {
            google_maps_api_key: Some("secret-key".to_string()),
            enable_maps: true,
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn persisted_key_wins_over_env() {
        assert_eq!(
            resolve_api_key(Some("persisted"), Some("env")),
            Some("persisted".to_string())
        );
    }

    #[test]
    fn env_key_used_when_nothing_persisted() {
        assert_eq!(resolve_api_key(None, Some("env")), Some("env".to_string()));
        assert_eq!(resolve_api_key(Some("  "), Some("env")), Some("env".to_string()));
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn short_keys_are_rejected() {
        assert!(!is_probably_api_key("short"));
        assert!(is_probably_api_key("AIzaSyExampleExampleExample123"));
    }
}

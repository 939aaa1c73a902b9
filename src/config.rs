//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::model::TimelineSettings;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timeline: TimelineSettings,
    /// Reopened on startup when it still exists.
    pub last_project: Option<PathBuf>,
}

impl AppConfig {
    /// Platform config directory, e.g. `~/.config/mission-roadmap` on Linux.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mission-roadmap", "mission-roadmap")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Read settings, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("No config at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load() -> Self {
        Self::default_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Best-effort write; failures are logged, not surfaced.
    pub fn save_to(&self, path: &Path) {
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!("Failed to create config dir {}: {}", dir.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    error!("Failed to write config {}: {}", path.display(), e);
                }
            }
            Err(e) => error!("Failed to serialize config: {}", e),
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::default_path() {
            self.save_to(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.timeline.zoom_in();
        config.last_project = Some(PathBuf::from("/tmp/site.roadmap.json"));
        config.save_to(&path);

        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn partial_and_broken_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(&path, r#"{ "timeline": { "day_width": 24.0 } }"#).unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.timeline.day_width, 24.0);
        assert_eq!(config.timeline.padding_days, 14);
        assert_eq!(config.last_project, None);

        std::fs::write(&path, "][").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        assert_eq!(
            AppConfig::load_from(&dir.path().join("absent.json")),
            AppConfig::default()
        );
    }
}

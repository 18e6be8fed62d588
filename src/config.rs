//! Editor configuration
//!
//! Read once at startup from `<config dir>/pipeweave/config.json`. Every field
//! is optional in the file; anything missing falls back to its default.

use crate::constants::board::DEFAULT_SIZE;
use crate::error::Result;
use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pipeweave";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Identity the project store files projects under
    pub user_id: String,
    /// Root directory of the local project store
    pub data_dir: PathBuf,
    pub board_width: f32,
    pub board_height: f32,
    /// Initial window size
    pub window_size: [f32; 2],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            data_dir: default_data_dir(),
            board_width: DEFAULT_SIZE[0],
            board_height: DEFAULT_SIZE[1],
            window_size: [1280.0, 800.0],
        }
    }
}

impl EditorConfig {
    /// Load from the user's config directory, falling back to defaults
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or malformed file yields the defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let file_content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&file_content)?;
        config.sanitize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn board_size(&self) -> Vec2 {
        Vec2::new(self.board_width, self.board_height)
    }

    fn sanitize(&mut self) {
        if self.board_width.is_nan() || self.board_width <= 0.0 {
            self.board_width = DEFAULT_SIZE[0];
        }
        if self.board_height.is_nan() || self.board_height <= 0.0 {
            self.board_height = DEFAULT_SIZE[1];
        }
        if self.user_id.trim().is_empty() {
            self.user_id = Self::default().user_id;
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("projects")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EditorConfig::load_or_default(&dir.path().join("config.json"));
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "user_id": "ada", "board_width": 3000.0 }"#).unwrap();

        let config = EditorConfig::load_from(&path).unwrap();
        assert_eq!(config.user_id, "ada");
        assert_eq!(config.board_size(), Vec2::new(3000.0, DEFAULT_SIZE[1]));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(EditorConfig::load_from(&path).is_err());
        assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
    }

    #[test]
    fn test_nonpositive_board_size_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig {
            board_width: -5.0,
            user_id: "  ".to_string(),
            ..EditorConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = EditorConfig::load_from(&path).unwrap();
        assert_eq!(loaded.board_width, DEFAULT_SIZE[0]);
        assert_eq!(loaded.user_id, "local");
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::progress::DEFAULT_FINALE_THRESHOLD;
use crate::engine::scene::{HiddenObjectScene, MapScene};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_finale_threshold")]
    pub finale_threshold: usize,
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: String,
    #[serde(default = "default_shuffle_drag_items")]
    pub shuffle_drag_items: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub map_scene: MapScene,
    #[serde(default)]
    pub hidden_object_scene: HiddenObjectScene,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_finale_threshold() -> usize {
    DEFAULT_FINALE_THRESHOLD
}
fn default_quiz_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quizdr")
        .join("quizzes")
        .to_string_lossy()
        .to_string()
}
fn default_shuffle_drag_items() -> bool {
    false
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            finale_threshold: default_finale_threshold(),
            quiz_dir: default_quiz_dir(),
            shuffle_drag_items: default_shuffle_drag_items(),
            log_level: default_log_level(),
            map_scene: MapScene::default(),
            hidden_object_scene: HiddenObjectScene::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdr")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file may have broken.
    pub fn validate(&mut self) {
        self.finale_threshold = self.finale_threshold.max(1);
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn quiz_dir(&self) -> PathBuf {
        PathBuf::from(&self.quiz_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.finale_threshold, 3);
        assert!(!config.shuffle_drag_items);
        assert_eq!(config.log_level, "info");
        assert!(config.quiz_dir.contains("quizzes"));
        assert_eq!(config.map_scene, MapScene::default());
    }

    #[test]
    fn test_config_partial_scene_override() {
        let toml_str = r#"
finale_threshold = 5

[map_scene.correct]
label = "Bathroom"
feedback = "Two walls, well done."
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.finale_threshold, 5);
        assert_eq!(config.map_scene.correct.label, "Bathroom");
        assert_eq!(config.map_scene.wrong, MapScene::default().wrong);
        assert_eq!(config.hidden_object_scene, HiddenObjectScene::default());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.finale_threshold, deserialized.finale_threshold);
        assert_eq!(config.quiz_dir, deserialized.quiz_dir);
        assert_eq!(config.hidden_object_scene, deserialized.hidden_object_scene);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.finale_threshold = 0;
        config.log_level = "  ".to_string();
        config.validate();
        assert_eq!(config.finale_threshold, 1);
        assert_eq!(config.log_level, "info");
    }
}

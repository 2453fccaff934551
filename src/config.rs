use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_DECAY_RATE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Energy lost per elapsed hour between interactions.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Display name of the companion.
    #[serde(default = "default_companion_name")]
    pub companion_name: String,
}

fn default_decay_rate() -> f64 {
    DEFAULT_DECAY_RATE
}

fn default_companion_name() -> String {
    "Maple".to_string()
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("maple")
        });

        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .context("Failed to read config.json")?;
            let mut config: Config = serde_json::from_str(&config_str)
                .context("Failed to parse config.json")?;
            config.data_dir = data_dir;
            return Ok(config);
        }

        let config = Config {
            data_dir,
            decay_rate: default_decay_rate(),
            companion_name: default_companion_name(),
        };
        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join("config.json");
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("companion.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(config.decay_rate, 1.0);
        assert_eq!(config.companion_name, "Maple");
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn test_reloads_saved_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        config.decay_rate = 2.5;
        config.companion_name = "Sakura".to_string();
        config.save().unwrap();

        let reloaded = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reloaded.decay_rate, 2.5);
        assert_eq!(reloaded.companion_name, "Sakura");
    }

    #[test]
    fn test_db_path_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.db_path(), dir.path().join("companion.db"));
    }
}

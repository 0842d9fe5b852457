use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Defaults to `<data_dir>/livemeeting/livemeeting.db`.
    pub db_path: Option<PathBuf>,
    /// Table holding the meeting snapshots.
    pub partition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Title given to a freshly created live meeting.
    pub default_title: String,
    /// Shown for chunks with neither a mapped nor a raw speaker label.
    pub unknown_speaker: String,
    /// Returned by the speaker color lookup when no color is mapped.
    pub fallback_speaker_color: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            partition: "live_meetings".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3838,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_title: "Live Meeting".to_string(),
            unknown_speaker: "Unknown Speaker".to_string(),
            fallback_speaker_color: "#9CA3AF".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => global::db_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            port = 4000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 4000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.store.partition, "live_meetings");
        assert_eq!(config.display.fallback_speaker_color, "#9CA3AF");
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let store = StoreConfig {
            db_path: Some(PathBuf::from("/tmp/meetings.db")),
            ..Default::default()
        };
        assert_eq!(
            store.resolve_db_path().unwrap(),
            PathBuf::from("/tmp/meetings.db")
        );
    }
}

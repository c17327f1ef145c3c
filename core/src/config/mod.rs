use crate::agent::EarlyStop;
use crate::error::Error;
use crate::transport::TransportMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FERRET_DIR: &str = ".ferret";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_iterations: usize,
    pub early_stop: EarlyStop,
    /// Replay prior turns as loop context.
    pub history: bool,
    pub transport: TransportMode,
    pub temperature: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            model: "llama3-8b-8192".to_string(),
            base_url: None,
            max_iterations: 15,
            early_stop: EarlyStop::BestEffort,
            history: true,
            transport: TransportMode::Direct,
            temperature: 0.7,
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    /// The credential is a hard precondition: without it the decision
    /// loop must never start.
    pub fn require_api_key(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(
                "no API key configured; run 'ferret onboard' first",
            ));
        }
        Ok(())
    }
}

pub fn get_ferret_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(FERRET_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_ferret_dir().join("config.toml")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(&get_config_path(), config)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("Config file not found. Run 'ferret onboard' to set up.")
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.api_key = "gsk_test".to_string();
        config.history = false;
        config.transport = TransportMode::Delegated;
        config.early_stop = EarlyStop::Error;

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.api_key, "gsk_test");
        assert!(!loaded.history);
        assert_eq!(loaded.transport, TransportMode::Delegated);
        assert_eq!(loaded.early_stop, EarlyStop::Error);
        assert_eq!(loaded.model, "llama3-8b-8192");
    }

    #[test]
    fn missing_file_is_a_clear_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("onboard"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_key = \"gsk_partial\"\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.api_key, "gsk_partial");
        assert_eq!(loaded.max_iterations, 15);
        assert!(loaded.history);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let config = Config::default();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

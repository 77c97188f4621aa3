///! CLI configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment_url: Option<String>,
    pub api_token: Option<String>,
    pub user_email: Option<String>,
    pub default_output: String,
    pub default_timezone: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_rotation: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment_url: None,
            api_token: None,
            user_email: None,
            default_output: "table".to_string(),
            default_timezone: None,
            log_level: "warn".to_string(),
            log_dir: None,
            log_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config/quiesce/cli.toml"))
    }

    /// Forget the stored credentials, keeping everything else
    pub fn clear_credentials(&mut self) {
        self.api_token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("cli.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_output, "table");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cli.toml");

        let config = Config {
            environment_url: Some("https://abc123.live.example.com".to_string()),
            api_token: Some("dt0c01.token".to_string()),
            user_email: Some("ops@example.com".to_string()),
            default_timezone: Some("Europe/Paris".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "user_email = \"ops@example.com\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.user_email.as_deref(), Some("ops@example.com"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "default_output = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_clear_credentials() {
        let mut config = Config {
            api_token: Some("secret".to_string()),
            user_email: Some("ops@example.com".to_string()),
            ..Default::default()
        };
        config.clear_credentials();
        assert!(config.api_token.is_none());
        assert!(config.user_email.is_some());
    }
}

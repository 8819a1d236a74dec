//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub line: LineConfig,
    pub storage: StorageConfig,
    pub rich_menu: RichMenuConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LineConfig {
    pub channel_secret: Option<String>,
    pub channel_access_token: Option<String>,
    pub api_base: String,
    pub data_api_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    /// Empty the store at startup
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RichMenuConfig {
    pub english_image: PathBuf,
    pub chinese_image: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "line-intro-bot".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                webhook_path: "/callback".to_string(),
            },
            line: LineConfig {
                channel_secret: None,
                channel_access_token: None,
                api_base: "https://api.line.me".to_string(),
                data_api_base: "https://api-data.line.me".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Json,
                path: PathBuf::from("db.json"),
                reset_on_start: false,
            },
            rich_menu: RichMenuConfig {
                english_image: PathBuf::from("rich-menu-formal-en.png"),
                chinese_image: PathBuf::from("rich-menu-formal-ch.png"),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment variables, looked up through `var`
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = var("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = Some(secret);
        }

        if let Some(token) = var("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = Some(token);
        }

        if let Some(port) = var("BOT_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(path) = var("BOT_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
    }

    /// Check the fields the webhook server cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line.channel_secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField(
                "line.channel-secret (or LINE_CHANNEL_SECRET)".to_string(),
            ));
        }
        if self.line.channel_access_token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField(
                "line.channel-access-token (or LINE_CHANNEL_ACCESS_TOKEN)".to_string(),
            ));
        }
        if !self.server.webhook_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "server.webhook-path must start with '/': {}",
                self.server.webhook_path
            )));
        }
        Ok(())
    }
}

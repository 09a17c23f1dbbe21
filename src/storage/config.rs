use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Missing configuration: {0}")]
    Missing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    pub gemini: GeminiConfig,
    pub extract: ExtractConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
    pub credential_cache: PathBuf,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiConfig {
    /// API keys tried in order during extraction fallback.
    pub api_keys: Vec<String>,
    /// Models tried in order under each key.
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractConfig {
    /// Category allow-list; empty means all categories.
    pub categories: Vec<String>,
    pub color_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarConfig {
    pub default: String,
    pub fetch_limit: u32,
}

fn default_models() -> Vec<String> {
    [
        "gemini-2.5-flash",
        "gemini-2.5-flash-lite",
        "gemini-2.5-pro",
        "gemini-3-flash-preview",
        "gemini-3-pro-preview",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_scopes() -> Vec<String> {
    [
        "https://www.googleapis.com/auth/calendar",
        "https://www.googleapis.com/auth/calendar.events",
        "https://www.googleapis.com/auth/userinfo.email",
        "openid",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Resolution order: config file, else environment variables, else a
    /// configuration error. This is the single credential-resolution
    /// strategy; there are deliberately no other lookup paths.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            return Self::from_toml(&content);
        }

        Self::from_env()
    }

    /// Environment fallback: `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, and
    /// `GEMINI_API_KEYS` (comma-separated, in fallback order).
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID".to_string()))?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
            .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET".to_string()))?;
        let api_keys: Vec<String> = std::env::var("GEMINI_API_KEYS")
            .map_err(|_| ConfigError::Missing("GEMINI_API_KEYS".to_string()))?
            .split(',')
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if api_keys.is_empty() {
            return Err(ConfigError::Missing("GEMINI_API_KEYS".to_string()));
        }

        let mut config = Self::default();
        config.google.client_id = client_id;
        config.google.client_secret = client_secret;
        config.gemini.api_keys = api_keys;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("syllacal")
            .join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("syllacal");

        Self {
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                token_uri: "https://oauth2.googleapis.com/token".to_string(),
                credential_cache: config_dir.join("credentials.json"),
                scopes: default_scopes(),
            },
            gemini: GeminiConfig {
                api_keys: Vec::new(),
                models: default_models(),
            },
            extract: ExtractConfig {
                categories: Vec::new(),
                color_id: "1".to_string(),
            },
            calendar: CalendarConfig {
                default: "primary".to_string(),
                fetch_limit: 50,
            },
        }
    }
}

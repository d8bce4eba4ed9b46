//! Configuration for the Telegram API session and download defaults
//!
//! Credentials come from the environment (a local `.env` is loaded first).
//! An optional `config.yml` may provide the same values, with `${VAR}`
//! placeholders resolved against the environment.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const SESSION_NAME: &str = "telegram_session";
pub const LOCK_FILE: &str = "telegram_session.lock";
pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

pub const ENV_API_ID: &str = "TELEGRAM_API_ID";
pub const ENV_API_HASH: &str = "TELEGRAM_API_HASH";
pub const ENV_PHONE: &str = "TELEGRAM_PHONE";

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    telegram: Option<TelegramConfig>,
    download: Option<DownloadConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    session_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadConfig {
    output_dir: Option<PathBuf>,
    limit: Option<usize>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub session_name: String,
    pub lock_file: String,
    pub output_dir: PathBuf,
    pub default_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml, falling back to the environment alone
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::from_env())
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> Self {
        Self::load_dotenv();
        Self::from_yaml(YamlConfig::default())
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> String {
        if let Some(ref v) = value {
            if let Some(var_name) = placeholder_name(v) {
                if let Ok(env_val) = std::env::var(var_name) {
                    return env_val;
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return env_val;
        }
        value
            .filter(|v| placeholder_name(v).is_none())
            .unwrap_or_default()
    }

    /// Resolve an integer value from string config or env var.
    /// A literal number in the file wins over the environment.
    fn resolve_env_i32(value: Option<String>, env_key: &str) -> i32 {
        if let Some(ref v) = value {
            if let Some(var_name) = placeholder_name(v) {
                if let Some(parsed) = std::env::var(var_name)
                    .ok()
                    .and_then(|env_val| env_val.trim().parse::<i32>().ok())
                {
                    return parsed;
                }
            }
            if let Ok(parsed) = v.trim().parse::<i32>() {
                return parsed;
            }
        }
        std::env::var(env_key)
            .ok()
            .and_then(|env_val| env_val.trim().parse::<i32>().ok())
            .unwrap_or(0)
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, String> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let yaml: YamlConfig = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(Self::from_yaml(yaml))
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        let telegram = yaml.telegram.unwrap_or_default();
        let download = yaml.download.unwrap_or_default();

        Self {
            api_id: Self::resolve_env_i32(telegram.api_id, ENV_API_ID),
            api_hash: Self::resolve_env_string(telegram.api_hash, ENV_API_HASH),
            phone: Self::resolve_env_string(telegram.phone, ENV_PHONE),
            session_name: telegram
                .session_name
                .unwrap_or_else(|| SESSION_NAME.to_string()),
            lock_file: LOCK_FILE.to_string(),
            output_dir: download
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            default_limit: download.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Create config with empty credentials
    #[cfg(test)]
    fn defaults() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            phone: String::new(),
            session_name: SESSION_NAME.to_string(),
            lock_file: LOCK_FILE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Path of the SQLite session file
    pub fn session_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.session", self.session_name))
    }

    /// Fail before any network activity when the API credentials are missing.
    pub fn require_credentials(&self) -> Result<()> {
        if self.api_id == 0 {
            return Err(Error::Config(format!(
                "{} is not set (add it to .env or config.yml)",
                ENV_API_ID
            )));
        }
        if self.api_hash.trim().is_empty() {
            return Err(Error::Config(format!(
                "{} is not set (add it to .env or config.yml)",
                ENV_API_HASH
            )));
        }
        Ok(())
    }
}

/// Extract `VAR` from a `${VAR}` placeholder
fn placeholder_name(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

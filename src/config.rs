//! Configuration loader and validator for the showcase server and feed CLI.
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub auth: Auth,
    pub media: Media,
    pub client: Client,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    pub bind: String,
    pub page_size: i64,
}

/// Shared key checked against `x-api-key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Auth {
    pub api_key: String,
}

/// Image upload service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Media {
    pub upload_url: String,
    pub api_key: String,
    pub folder: String,
}

/// Settings for clients talking to a running server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub graphql_url: String,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.app
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid("app.bind must be a socket address"))
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}/showcase.db", self.app.data_dir)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    cfg.bind_addr()?;
    if cfg.app.page_size <= 0 {
        return Err(ConfigError::Invalid("app.page_size must be > 0"));
    }

    if cfg.auth.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("auth.api_key must be non-empty"));
    }

    if cfg.media.upload_url.trim().is_empty() {
        return Err(ConfigError::Invalid("media.upload_url must be non-empty"));
    }
    if cfg.media.folder.trim().is_empty() {
        return Err(ConfigError::Invalid("media.folder must be non-empty"));
    }

    if cfg.client.graphql_url.trim().is_empty() {
        return Err(ConfigError::Invalid("client.graphql_url must be non-empty"));
    }

    Ok(())
}

pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  bind: "127.0.0.1:3000"
  page_size: 9

auth:
  api_key: "YOUR_SHARED_API_KEY"

media:
  upload_url: "https://api.cloudinary.com/v1_1/YOUR_CLOUD/image/upload"
  api_key: "YOUR_MEDIA_API_KEY"
  folder: "showcase"

client:
  graphql_url: "http://127.0.0.1:3000/graphql"
"#
}

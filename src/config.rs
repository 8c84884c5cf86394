// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::fetch::BROWSER_USER_AGENT;

pub const ENV_CONFIG_PATH: &str = "NEWS_GLOBE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/news_globe.toml";

fn default_credentials_dir() -> PathBuf {
    PathBuf::from("config")
}
fn default_credentials_file() -> String {
    "credentials.json".to_string()
}
fn default_location() -> String {
    "US".to_string()
}
fn default_result_limit() -> u32 {
    100
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_fetch_attempts() -> u32 {
    3
}
fn default_fetch_retry_delay_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
fn default_wikipedia_endpoint() -> String {
    crate::upstream::wikipedia::DEFAULT_ENDPOINT.to_string()
}
fn default_thumbnail_size() -> u32 {
    300
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory the credentials filename is resolved against.
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,
    /// `CREDENTIALS_FILE` overrides.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    /// `BIGQUERY_PROJECT` overrides; otherwise taken from the credentials file.
    #[serde(default)]
    pub bigquery_project: Option<String>,
    #[serde(default = "default_location")]
    pub bigquery_location: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_fetch_retry_delay_ms")]
    pub fetch_retry_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_wikipedia_endpoint")]
    pub wikipedia_endpoint: String,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Mount `/metrics`. `DEBUG_ROUTES=1` turns it on.
    #[serde(default)]
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials_dir: default_credentials_dir(),
            credentials_file: default_credentials_file(),
            bigquery_project: None,
            bigquery_location: default_location(),
            result_limit: default_result_limit(),
            cache_ttl_secs: default_cache_ttl_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_attempts: default_fetch_attempts(),
            fetch_retry_delay_ms: default_fetch_retry_delay_ms(),
            user_agent: default_user_agent(),
            wikipedia_endpoint: default_wikipedia_endpoint(),
            thumbnail_size: default_thumbnail_size(),
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing news_globe config")
    }

    /// Load from an explicit path. No env overrides are applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $NEWS_GLOBE_CONFIG
    /// 2) config/news_globe.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_nonempty("CREDENTIALS_FILE") {
            self.credentials_file = v;
        }
        if let Some(v) = env_nonempty("BIGQUERY_PROJECT") {
            self.bigquery_project = Some(v);
        }
        if let Some(v) = env_parse("CACHE_TTL_SECS") {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = env_parse("FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = v;
        }
        if let Some(v) = env_parse("FETCH_ATTEMPTS") {
            self.fetch_attempts = v;
        }
        if env_nonempty("DEBUG_ROUTES").as_deref() == Some("1") {
            self.metrics_enabled = true;
        }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_dir.join(&self.credentials_file)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_nonempty(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root of the dashboard API, without a trailing `/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Timer periods for the three polling loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    #[serde(default = "default_log_tail_interval_ms")]
    pub log_tail_interval_ms: u64,
    #[serde(default = "default_playlist_interval_ms")]
    pub playlist_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Points kept per chart series.
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,
    /// Rows kept in the log tail view before the oldest are evicted.
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
    /// How close (in rows) to the bottom a manual scroll must land to
    /// re-enable auto-scroll.
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_enabled")]
    pub enabled: bool,
    /// Explicit Socket.IO websocket URL.  Derived from `server.base_url` when unset.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Persisted guild/channel selection.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval_ms(),
            log_tail_interval_ms: default_log_tail_interval_ms(),
            playlist_interval_ms: default_playlist_interval_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            series_capacity: default_series_capacity(),
            max_log_lines: default_max_log_lines(),
            scroll_threshold: default_scroll_threshold(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: default_push_enabled(),
            url: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            log_file: default_log_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_status_interval_ms() -> u64 {
    5000
}

fn default_log_tail_interval_ms() -> u64 {
    1000
}

fn default_playlist_interval_ms() -> u64 {
    5000
}

fn default_series_capacity() -> usize {
    20
}

fn default_max_log_lines() -> usize {
    1000
}

fn default_scroll_threshold() -> usize {
    1
}

fn default_push_enabled() -> bool {
    true
}

fn default_session_file() -> PathBuf {
    platform::data_dir().join("session.json")
}

fn default_log_file() -> PathBuf {
    platform::data_dir().join("botdash.log")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Socket.IO endpoint of the push channel (Engine.IO v4, websocket transport).
    ///
    /// `http://host:port/x` becomes `ws://host:port/x/socket.io/?EIO=4&transport=websocket`,
    /// `https` maps to `wss`.
    pub fn push_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.push.url {
            return Ok(url.clone());
        }
        let mut url = url::Url::parse(&self.server.base_url)?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| anyhow::anyhow!("cannot derive push url from {}", self.server.base_url))?;
        let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(Some("EIO=4&transport=websocket"));
        Ok(url.to_string())
    }
}

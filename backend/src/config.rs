//! Guide configuration file support.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [guide]
//! tick_interval_secs = 60
//! window_hours = 2
//! viewport = "wide"
//! malformed_policy = "clamp"
//! palette = ["#4c6ef5", "#7950f2"]
//! show_remaining_time = true
//!
//! [client]
//! base_url = "http://guide.local:8080"
//! timeout_secs = 10
//!
//! [seed]
//! file = "demos/seed.json"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::services::presentation::{Viewport, DEFAULT_PALETTE};
use crate::services::sanitize::MalformedLineupPolicy;
use crate::services::settings::{GuideSettings, SettingsAction, DEFAULT_WINDOW_HOURS};

pub const CONFIG_FILE_NAME: &str = "guide.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("No {0} found in standard locations")]
    NotFound(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub guide: GuideDisplaySettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideDisplaySettings {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub malformed_policy: MalformedLineupPolicy,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_show_remaining_time")]
    pub show_remaining_time: bool,
}

/// Remote guide backend used by the HTTP lineup source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSettings {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_window_hours() -> u32 {
    DEFAULT_WINDOW_HOURS
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn default_show_remaining_time() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GuideDisplaySettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            window_hours: default_window_hours(),
            viewport: Viewport::default(),
            malformed_policy: MalformedLineupPolicy::default(),
            palette: default_palette(),
            show_remaining_time: default_show_remaining_time(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GuideConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `guide.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound(CONFIG_FILE_NAME))
    }

    /// Configuration for the server binary: `GUIDE_CONFIG` if set, otherwise
    /// the default locations, otherwise built-in defaults. Environment
    /// overrides are applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var("GUIDE_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => {
                    log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `HOST`, `PORT`, `GUIDE_BASE_URL` and `GUIDE_SEED_FILE` as
    /// returned by `lookup`.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT".to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(base_url) = lookup("GUIDE_BASE_URL") {
            self.client.base_url = Some(base_url);
        }
        if let Some(file) = lookup("GUIDE_SEED_FILE") {
            self.seed.file = Some(PathBuf::from(file));
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.guide.tick_interval_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs)
    }

    /// Initial display settings. Goes through the reducer so `window_hours`
    /// gets the same clamping as a runtime change.
    pub fn to_settings(&self) -> GuideSettings {
        let mut actions = vec![
            SettingsAction::SetViewport(self.guide.viewport),
            SettingsAction::SetWindowHours(self.guide.window_hours),
            SettingsAction::SetPolicy(self.guide.malformed_policy),
            SettingsAction::SetPalette(self.guide.palette.clone()),
        ];
        if !self.guide.show_remaining_time {
            actions.push(SettingsAction::ToggleRemainingTime);
        }
        GuideSettings::default().reduce_all(actions)
    }
}

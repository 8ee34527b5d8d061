use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::UnitSystem;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_BASE: &str = "https://openweathermap.org";

/// Provider endpoints. Overridable so tests can point at a local fake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub api_base: String,
    pub icon_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            icon_base: DEFAULT_ICON_BASE.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
///
/// [endpoints]
/// api_base = "https://api.openweathermap.org/data/2.5"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Unit system preselected for new queries.
    pub units: UnitSystem,

    pub endpoints: Endpoints,
}

/// Everything the HTTP client needs, resolved from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_base: String,
    pub icon_base: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let endpoints = Endpoints::default();
        Self {
            api_key: api_key.into(),
            api_base: endpoints.api_base,
            icon_base: endpoints.icon_base,
        }
    }

    /// Point both endpoints at `base`; used against fake providers.
    pub fn with_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_base = base.to_string();
        self.icon_base = base.to_string();
        self
    }
}

impl Config {
    /// Resolve the client configuration, failing with a hint if no API key is set.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })?;

        Ok(ClientConfig {
            api_key: api_key.to_string(),
            api_base: self.endpoints.api_base.trim_end_matches('/').to_string(),
            icon_base: self.endpoints.icon_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_units(&mut self, units: UnitSystem) {
        self.units = units;
    }

    /// Replace the stored key with `key` when it is present and non-empty.
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Load config from disk and apply environment overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::units::MAX_DECIMAL_PLACES;

/// Where the upstream services live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every service path is appended to, e.g. "http://127.0.0.1:8080".
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    /// Maximum fractional digits accepted for latitude and longitude.
    pub coordinate_decimal_places: u32,
    /// Digits kept on every per-service reading.
    pub temperature_decimal_places: u32,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            coordinate_decimal_places: 6,
            temperature_decimal_places: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8000".to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [upstream]
/// base_url = "http://127.0.0.1:8080"
/// timeout_secs = 10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub precision: PrecisionConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from `path`, or return defaults if there is no file there.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-avg", "weather-avg")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.upstream.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("upstream.base_url must be an http:// or https:// URL, got '{url}'");
        }
        if self.upstream.timeout_secs == 0 {
            bail!("upstream.timeout_secs must be greater than zero");
        }
        for (key, places) in [
            ("coordinate_decimal_places", self.precision.coordinate_decimal_places),
            ("temperature_decimal_places", self.precision.temperature_decimal_places),
        ] {
            if places > MAX_DECIMAL_PLACES {
                bail!("precision.{key} must be at most {MAX_DECIMAL_PLACES}, got {places}");
            }
        }
        Ok(())
    }
}

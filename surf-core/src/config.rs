use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_MARINE_ENDPOINT: &str = "https://marine-api.open-meteo.com/v1/marine";
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Upper bound Open-Meteo accepts for `count`.
pub const MAX_RESULT_COUNT: u8 = 100;

/// Geocoding lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    /// Maximum number of candidates requested per search.
    pub count: u8,
    pub language: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            count: 10,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarineConfig {
    pub endpoint: String,
}

impl Default for MarineConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_MARINE_ENDPOINT.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_query_len: usize,
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_len: DEFAULT_MIN_QUERY_LEN, debounce_ms: DEFAULT_DEBOUNCE_MS }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [geocoding]
/// language = "de"
///
/// [search]
/// debounce_ms = 500
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingConfig,
    pub marine: MarineConfig,
    pub search: SearchConfig,
}

/// Timing and threshold values the search flow runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub min_query_len: usize,
    pub debounce: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents).context("Failed to parse configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

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
        let dirs = ProjectDirs::from("dev", "surf-report", "surf-report")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        validate_endpoint("geocoding", &self.geocoding.endpoint)?;
        validate_endpoint("marine", &self.marine.endpoint)?;

        if self.geocoding.count == 0 || self.geocoding.count > MAX_RESULT_COUNT {
            bail!(
                "geocoding.count must be between 1 and {MAX_RESULT_COUNT}, got {}",
                self.geocoding.count
            );
        }
        if self.geocoding.language.trim().is_empty() {
            bail!("geocoding.language cannot be empty");
        }
        if self.search.min_query_len == 0 {
            bail!("search.min_query_len must be at least 1");
        }
        if self.search.debounce_ms == 0 {
            bail!("search.debounce_ms must be greater than zero");
        }

        Ok(())
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            min_query_len: self.search.min_query_len,
            debounce: Duration::from_millis(self.search.debounce_ms),
        }
    }
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<()> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        Ok(())
    } else {
        Err(anyhow!("{name}.endpoint must be an http(s) URL, got '{endpoint}'"))
    }
}

//! Map session configuration.

use crate::camera::ViewState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment variable holding the remote store base URL.
pub const BASE_URL_ENV: &str = "GEOBASE_URL";
/// Environment variable holding the anonymous API key.
pub const ANON_KEY_ENV: &str = "GEOBASE_ANON_KEY";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing env variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid base URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings shared by the controller, tile registry and remote store client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Remote store origin; tile and REST endpoints hang off it.
    pub base_url: String,
    /// Anonymous API key embedded in tile URLs and REST requests.
    pub anon_key: String,
    /// View used when a project declares no bounds.
    pub default_view: ViewState,
    /// Padding in pixels when fitting project bounds.
    pub recenter_padding: f64,
    /// Duration of the fit-bounds animation.
    pub recenter_duration_ms: u32,
    /// Duration of the fly-to animation.
    pub fly_duration_ms: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_string(),
            anon_key: String::new(),
            default_view: ViewState::default(),
            recenter_padding: 100.0,
            recenter_duration_ms: 1000,
            fly_duration_ms: 1000,
        }
    }
}

impl MapConfig {
    /// Build a config for the given origin and key, keeping other defaults.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Read `GEOBASE_URL` and `GEOBASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(BASE_URL_ENV).map_err(|_| ConfigError::MissingEnv(BASE_URL_ENV))?;
        let anon_key = std::env::var(ANON_KEY_ENV).map_err(|_| ConfigError::MissingEnv(ANON_KEY_ENV))?;
        Self::new(base_url, anon_key)
    }

    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

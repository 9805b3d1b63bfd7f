use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use url::Url;

use crate::domain::Coordinates;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_STORAGE_PATH: &str = ".ecowaste/storage.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{key} is not a valid url: {source}")]
    InvalidUrl {
        key: &'static str,
        source: url::ParseError,
    },
    #[error("device location must be \"lat,lon\", got {0:?}")]
    InvalidLocation(String),
}

// Runtime settings for the portal client. File values first, env on top.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub api_url: String,
    pub geocoder_url: String,
    pub storage_path: PathBuf,
    pub download_dir: PathBuf,
    // Unset means calls wait as long as the backend takes.
    pub http_timeout_ms: Option<u64>,
    pub device_location: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            http_timeout_ms: None,
            device_location: None,
        }
    }
}

impl PortalConfig {
    /// Reads `PORTAL_CONFIG` (if set) and the `PORTAL_*` environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var("PORTAL_CONFIG").ok().map(PathBuf::from);
        Self::from_sources(file.as_deref(), |key| env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(value) = lookup("PORTAL_API_URL") {
            config.api_url = value;
        }
        if let Some(value) = lookup("PORTAL_GEOCODER_URL") {
            config.geocoder_url = value;
        }
        if let Some(value) = lookup("PORTAL_STORAGE_PATH") {
            config.storage_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("PORTAL_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(value);
        }
        if let Some(millis) = lookup("PORTAL_HTTP_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.http_timeout_ms = Some(millis);
        }
        if let Some(value) = lookup("PORTAL_DEVICE_LOCATION") {
            config.device_location = Some(value);
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("api_url", &self.api_url)?;
        check_url("geocoder_url", &self.geocoder_url)?;
        self.device_position()?;
        Ok(())
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_ms
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    /// Configured device position; `None` when the host has no geolocation.
    pub fn device_position(&self) -> Result<Option<Coordinates>, ConfigError> {
        let Some(raw) = self.device_location.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let invalid = || ConfigError::InvalidLocation(raw.to_string());
        let (lat, lon) = raw.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }

        Ok(Some(Coordinates {
            latitude,
            longitude,
        }))
    }
}

fn check_url(key: &'static str, raw: &str) -> Result<(), ConfigError> {
    Url::parse(raw)
        .map(drop)
        .map_err(|source| ConfigError::InvalidUrl { key, source })
}

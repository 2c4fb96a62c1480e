//! Process settings: defaults, optional TOML file, environment overrides.

use crate::discovery::domain::{ParseProtocolVersionError, ProtocolVersionTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default directory search endpoint.
pub const DEFAULT_DIRECTORY_URL: &str = "https://smart-api.info/api/query";

/// Default protocol version whose `<major>.<minor>` line is accepted.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.3.0";

/// Default bound on a single manifest fetch, in seconds.
pub const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`CatalogSettings`].
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override has an invalid value.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// The protocol version target is malformed.
    #[error(transparent)]
    ProtocolVersion(#[from] ParseProtocolVersionError),
}

/// Settings for the catalog process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// `PostgreSQL` connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Directory search endpoint.
    pub directory_url: String,
    /// Protocol version whose `<major>.<minor>` line is accepted.
    pub target_protocol_version: String,
    /// Bound on a single manifest fetch, in seconds.
    pub manifest_timeout_secs: u64,
    /// Period of automatic refreshes, in seconds; refreshes once when unset.
    pub refresh_interval_secs: Option<u64>,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            directory_url: DEFAULT_DIRECTORY_URL.to_owned(),
            target_protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
            manifest_timeout_secs: DEFAULT_MANIFEST_TIMEOUT_SECS,
            refresh_interval_secs: None,
            log_level: String::from("info"),
            log_json: false,
        }
    }
}

impl CatalogSettings {
    /// Loads settings from an optional TOML file, then applies process
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or an
    /// override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Reads settings from a TOML file; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Recognized keys: `DATABASE_URL`, `KP_DIRECTORY_URL`,
    /// `KP_TRAPI_VERSION`, `KP_MANIFEST_TIMEOUT_SECS`,
    /// `KP_REFRESH_INTERVAL_SECS`, `KP_LOG_LEVEL` and `KP_LOG_JSON`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean
    /// override does not parse.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("KP_DIRECTORY_URL") {
            self.directory_url = value;
        }
        if let Some(value) = lookup("KP_TRAPI_VERSION") {
            self.target_protocol_version = value;
        }
        if let Some(value) = lookup("KP_MANIFEST_TIMEOUT_SECS") {
            self.manifest_timeout_secs = parse_override("KP_MANIFEST_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("KP_REFRESH_INTERVAL_SECS") {
            self.refresh_interval_secs = Some(parse_override("KP_REFRESH_INTERVAL_SECS", value)?);
        }
        if let Some(value) = lookup("KP_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("KP_LOG_JSON") {
            self.log_json = parse_override("KP_LOG_JSON", value)?;
        }
        Ok(self)
    }

    /// Returns the accepted protocol line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProtocolVersion`] when the target is malformed.
    pub fn protocol_target(&self) -> Result<ProtocolVersionTarget, ConfigError> {
        Ok(self.target_protocol_version.parse()?)
    }

    /// Returns the manifest fetch timeout.
    #[must_use]
    pub const fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    /// Returns the refresh period, if periodic refresh is enabled.
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

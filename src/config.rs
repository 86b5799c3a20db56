//! Manager configuration from an optional YAML file and the environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::S3Settings;
use crate::resolver::DEFAULT_INCREMENT_CEILING;
use crate::storage::DEFAULT_CREATE_RETRIES;

/// Names a YAML config file read before the environment overrides.
pub const CONFIG_FILE_VAR: &str = "FILEMAN_CONFIG";

const LOCAL_ROOT_VAR: &str = "FILEMAN_LOCAL_ROOT";
const INCREMENT_CEILING_VAR: &str = "FILEMAN_INCREMENT_CEILING";
const CREATE_RETRIES_VAR: &str = "FILEMAN_CREATE_RETRIES";
const S3_REGION_VAR: &str = "FILEMAN_S3_REGION";
const S3_ENDPOINT_VAR: &str = "FILEMAN_S3_ENDPOINT";
const S3_ALLOW_HTTP_VAR: &str = "FILEMAN_S3_ALLOW_HTTP";

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`ManagerConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },
    /// An environment variable held an unusable value.
    #[error("invalid value {value:?} for {var}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Settings for building a [`FileManager`](crate::manager::FileManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Directory relative local paths resolve against; empty means the
    /// working directory.
    pub local_root: PathBuf,
    /// Suffixed candidates probed before giving up.
    pub increment_ceiling: u32,
    /// Re-resolutions after losing an exclusive create.
    pub create_retries: u32,
    /// AWS region for `s3://` paths.
    pub s3_region: Option<String>,
    /// Custom S3 endpoint, e.g. a local `MinIO`.
    pub s3_endpoint: Option<String>,
    /// Allow plain HTTP to the endpoint.
    pub s3_allow_http: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            local_root: PathBuf::new(),
            increment_ceiling: DEFAULT_INCREMENT_CEILING,
            create_retries: DEFAULT_CREATE_RETRIES,
            s3_region: None,
            s3_endpoint: None,
            s3_allow_http: false,
        }
    }
}

impl ManagerConfig {
    /// Loads `.env` if present, then the file named by `FILEMAN_CONFIG`,
    /// then applies `FILEMAN_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`ManagerConfig::from_env`] over an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or a value is invalid.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(root) = lookup(LOCAL_ROOT_VAR) {
            config.local_root = PathBuf::from(root);
        }
        if let Some(raw) = lookup(INCREMENT_CEILING_VAR) {
            config.increment_ceiling = parse_var(INCREMENT_CEILING_VAR, raw)?;
        }
        if let Some(raw) = lookup(CREATE_RETRIES_VAR) {
            config.create_retries = parse_var(CREATE_RETRIES_VAR, raw)?;
        }
        if let Some(region) = lookup(S3_REGION_VAR) {
            config.s3_region = Some(region);
        }
        if let Some(endpoint) = lookup(S3_ENDPOINT_VAR) {
            config.s3_endpoint = Some(endpoint);
        }
        if let Some(raw) = lookup(S3_ALLOW_HTTP_VAR) {
            config.s3_allow_http = parse_var(S3_ALLOW_HTTP_VAR, raw)?;
        }
        Ok(config)
    }

    /// Reads a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Object storage settings derived from this config.
    #[must_use]
    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            region: self.s3_region.clone(),
            endpoint: self.s3_endpoint.clone(),
            allow_http: self.s3_allow_http,
        }
    }
}

fn parse_var<T: FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

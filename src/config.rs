//! Runtime configuration.
//!
//! Settings come from an optional TOML file, then `LANDSCAPE_*` environment
//! variables, then command-line flags (applied by the binary).
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! cors_origin = "http://localhost:5173"
//!
//! [database]
//! path = "landscape.db"
//!
//! [query]
//! default_page_size = 20
//! max_page_size = 100
//!
//! [export]
//! max_rows = 10000
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::query::QueryLimits;

pub const ENV_DATABASE: &str = "LANDSCAPE_DATABASE";
pub const ENV_PORT: &str = "LANDSCAPE_PORT";
pub const ENV_CORS_ORIGIN: &str = "LANDSCAPE_CORS_ORIGIN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting {key}: {message}")]
    Invalid { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "landscape.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        let limits = QueryLimits::default();
        Self {
            default_page_size: limits.default_page_size,
            max_page_size: limits.max_page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub max_rows: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { max_rows: 10_000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub query: QuerySettings,
    pub export: ExportSettings,
}

impl RegistryConfig {
    /// Load `path` if it exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let mut values = HashMap::new();
        for key in [ENV_DATABASE, ENV_PORT, ENV_CORS_ORIGIN] {
            if let Ok(value) = std::env::var(key) {
                values.insert(key.to_string(), value);
            }
        }
        self.apply_overrides(&values)
    }

    /// Apply `LANDSCAPE_*` style overrides; blank values are ignored.
    pub fn apply_overrides(&mut self, values: &HashMap<String, String>) -> Result<(), ConfigError> {
        let get = |key: &str| {
            values
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = get(ENV_DATABASE) {
            self.database.path = path.to_string();
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PORT.to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(origin) = get(ENV_CORS_ORIGIN) {
            self.server.cors_origin = Some(origin.to_string());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::Invalid {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.query.max_page_size == 0 {
            return Err(invalid("query.max_page_size", "must be positive"));
        }
        if self.query.default_page_size == 0 {
            return Err(invalid("query.default_page_size", "must be positive"));
        }
        if self.query.default_page_size > self.query.max_page_size {
            return Err(invalid(
                "query.default_page_size",
                "must not exceed query.max_page_size",
            ));
        }
        if self.export.max_rows == 0 {
            return Err(invalid("export.max_rows", "must be positive"));
        }
        Ok(())
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            default_page_size: self.query.default_page_size,
            max_page_size: self.query.max_page_size,
        }
    }
}

//! Host configuration.
//!
//! Read from a TOML file with `[server]`, `[logging]` and `[impact]`
//! sections. A missing file is not an error: defaults apply and the caller
//! is told so through [`ConfigOrigin`].

use impact_core::ImpactConfig;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/impact.toml";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to resolve server address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server address {0} resolved to nothing")]
    Unresolved(String),
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub impact: ImpactConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Resolves `host:port`; host names such as `localhost` are looked up.
    pub async fn resolve(&self) -> Result<SocketAddr, ConfigLoadError> {
        let address = format!("{}:{}", self.host, self.port);
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| ConfigLoadError::Resolve {
                address: address.clone(),
                source,
            })?;
        addrs.next().ok_or(ConfigLoadError::Unresolved(address))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Appended to in addition to stderr. Missing directories are created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// The configured level, or `info` when it is not a level name.
    pub fn effective_level(&self) -> &str {
        let level = self.level.trim();
        if LOG_LEVELS.contains(&level) {
            level
        } else {
            "info"
        }
    }

    pub fn is_valid(&self) -> bool {
        LOG_LEVELS.contains(&self.level.trim())
    }

    /// Opens the configured log file for appending, if there is one.
    pub fn open_file(&self) -> Result<Option<File>, ConfigLoadError> {
        let Some(path) = &self.file else {
            return Ok(None);
        };
        let log_err = |source| ConfigLoadError::LogFile {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(log_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_err)?;
        Ok(Some(file))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults { missing: PathBuf },
}

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub origin: ConfigOrigin,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigLoadError> {
        toml::from_str(raw).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`, or [`DEFAULT_CONFIG_PATH`] when none is given.
    pub fn load(path: Option<&Path>) -> Result<LoadedConfig, ConfigLoadError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedConfig {
                    config: AppConfig::default(),
                    origin: ConfigOrigin::Defaults { missing: path },
                });
            }
            Err(source) => return Err(ConfigLoadError::Read { path, source }),
        };

        let config = Self::from_toml_str(&raw, &path)?;
        Ok(LoadedConfig {
            config,
            origin: ConfigOrigin::File(path),
        })
    }
}

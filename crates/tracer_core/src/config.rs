//! Tracer configuration file.
//!
//! # Responsibility
//! - Load deployment settings from a JSON file.
//! - Reject settings the tracer cannot run with before anything starts.
//!
//! # Invariants
//! - `marker_settings` keeps the key order of the file.
//! - A loaded config has passed [`TracerConfig::validate`].

use crate::logging::default_log_level;
use crate::service::document_builder::DocumentSettings;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_CRAWL_INTERVAL_HOURS: u64 = 24;
const DEFAULT_PORT: u16 = 5000;

/// Configuration loading/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Deployment settings for the tracer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracerConfig {
    /// SQLite store written by the indexer.
    pub db_path: PathBuf,
    /// Prepended to curation URIs in backlinks; empty disables it.
    #[serde(default)]
    pub curation_link_prefix: String,
    /// Marker styling copied into every annotation.
    #[serde(default)]
    pub marker_settings: Map<String, Value>,
    #[serde(default = "default_crawl_interval_hours")]
    pub crawl_interval_hours: u64,
    /// External indexer program and arguments.
    #[serde(default)]
    pub crawl_command: Option<Vec<String>>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Keep query tokens stable across restarts.
    #[serde(default)]
    pub stable_identifiers: bool,
    /// Overrides the base URL derived from request headers.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_crawl_interval_hours() -> u64 {
    DEFAULT_CRAWL_INTERVAL_HOURS
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl TracerConfig {
    /// Config with defaults for everything but the store path.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            curation_link_prefix: String::new(),
            marker_settings: Map::new(),
            crawl_interval_hours: DEFAULT_CRAWL_INTERVAL_HOURS,
            crawl_command: None,
            port: DEFAULT_PORT,
            log_level: default_level(),
            log_dir: None,
            stable_identifiers: false,
            public_base_url: None,
        }
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates config JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if self.crawl_interval_hours == 0 {
            return Err(ConfigError::Invalid(
                "crawl_interval_hours must be at least 1".to_string(),
            ));
        }
        if let Some(command) = &self.crawl_command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "crawl_command must name a program".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Rendering settings consumed by the document builder.
    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            curation_link_prefix: self.curation_link_prefix.clone(),
            marker_settings: self.marker_settings.clone(),
        }
    }
}

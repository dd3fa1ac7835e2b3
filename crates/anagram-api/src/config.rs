//! Service configuration
//!
//! Settings come from a TOML file (default `anagram.toml`, or
//! `ANAGRAM_CONFIG_PATH`), then selected environment variables override them.
//! A missing file is not an error; built-in defaults are used instead.

use crate::tracing_setup::LoggingConfig;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "anagram.toml";

/// PostgreSQL caps a statement at 65 535 bind parameters and each key takes two.
pub const MAX_BULK_LOAD_BATCH_SIZE: usize = 30_000;

/// Most storage calls a single request makes (a similarity lookup: key check,
/// bucket fetch, sample write).
pub const MAX_STORAGE_CALLS_PER_REQUEST: u64 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the effective configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    #[default]
    Defaults,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000, request_timeout_seconds: 30 }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bad bind address '{}': {e}", self.host)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Where words and samples are kept. `Memory` loses everything on restart and
/// is meant for tests and local runs.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::Invalid(format!("unknown storage backend '{other}'"))),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub call_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 10,
            acquire_timeout_seconds: 5,
            call_timeout_ms: 5000,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    pub word_list_path: Option<PathBuf>,
    pub bulk_load_batch_size: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            word_list_path: None,
            bulk_load_batch_size: anagram_core::DEFAULT_BULK_LOAD_BATCH_SIZE,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AnagramConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub dictionary: DictionaryConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl AnagramConfig {
    /// Load from `path`, else `ANAGRAM_CONFIG_PATH`, else `anagram.toml`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("ANAGRAM_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let mut config = Self::from_toml(&contents)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        config.source = ConfigSource::File(path);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = std::env::var("ANAGRAM_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ANAGRAM_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("ANAGRAM_PORT '{port}' is not a port")))?;
        }
        if let Ok(backend) = std::env::var("ANAGRAM_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Ok(url) =
            std::env::var("ANAGRAM_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
        {
            self.storage.database_url = Some(url);
        }
        if let Ok(path) = std::env::var("ANAGRAM_WORD_LIST") {
            self.dictionary.word_list_path = Some(PathBuf::from(path));
        }
        if let Ok(format) = std::env::var("ANAGRAM_LOG_FORMAT") {
            self.logging.format = format.parse().map_err(ConfigError::Invalid)?;
        }
        Ok(self)
    }

    /// Reject settings that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::Invalid(
                "storage.backend = \"postgres\" requires storage.database_url".to_string(),
            ));
        }
        if !(1..=MAX_BULK_LOAD_BATCH_SIZE).contains(&self.dictionary.bulk_load_batch_size) {
            return Err(ConfigError::Invalid(format!(
                "dictionary.bulk_load_batch_size must be between 1 and {MAX_BULK_LOAD_BATCH_SIZE}"
            )));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid("storage.max_connections must be positive".into()));
        }
        if self.storage.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid("storage.call_timeout_ms must be positive".into()));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_seconds must be positive".into(),
            ));
        }
        let storage_budget_ms =
            self.storage.call_timeout_ms.saturating_mul(MAX_STORAGE_CALLS_PER_REQUEST);
        if self.server.request_timeout_seconds.saturating_mul(1000) <= storage_budget_ms {
            return Err(ConfigError::Invalid(format!(
                "server.request_timeout_seconds must exceed {MAX_STORAGE_CALLS_PER_REQUEST} x \
                 storage.call_timeout_ms ({storage_budget_ms} ms)"
            )));
        }
        self.server.bind_address()?;
        Ok(())
    }
}

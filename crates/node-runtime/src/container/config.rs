//! # Node Configuration
//!
//! Runtime parameters of the node, read from the environment.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `QC_DATA_DIR` | data directory | `./data` |
//! | `QC_STORAGE_BACKEND` | `memory` or `rocksdb` | `memory` |
//! | `QC_GENESIS_FILE` | genesis JSON file | none (default network) |
//! | `QC_OVERRIDE_ARROW_GLACIER` | Arrow Glacier block override | none |
//! | `QC_OVERRIDE_TTD` | terminal total difficulty override | none |

use shared_types::serde_helpers::{parse_u256, parse_u64};
use shared_types::ConfigOverrides;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_DATA_DIR: &str = "QC_DATA_DIR";
pub const ENV_STORAGE_BACKEND: &str = "QC_STORAGE_BACKEND";
pub const ENV_GENESIS_FILE: &str = "QC_GENESIS_FILE";
pub const ENV_OVERRIDE_ARROW_GLACIER: &str = "QC_OVERRIDE_ARROW_GLACIER";
pub const ENV_OVERRIDE_TTD: &str = "QC_OVERRIDE_TTD";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub genesis: GenesisConfig,
}

impl NodeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unset variables keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(ENV_STORAGE_BACKEND) {
            config.storage.backend = backend.parse()?;
        }
        if let Some(file) = lookup(ENV_GENESIS_FILE) {
            config.genesis.file = Some(PathBuf::from(file));
        }
        if let Some(raw) = lookup(ENV_OVERRIDE_ARROW_GLACIER) {
            let block = parse_u64(&raw).map_err(|e| invalid(ENV_OVERRIDE_ARROW_GLACIER, &raw, e))?;
            config.genesis.overrides.arrow_glacier_block = Some(block);
        }
        if let Some(raw) = lookup(ENV_OVERRIDE_TTD) {
            let ttd = parse_u256(&raw).map_err(|e| invalid(ENV_OVERRIDE_TTD, &raw, e))?;
            config.genesis.overrides.terminal_total_difficulty = Some(ttd);
        }

        Ok(config)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown storage backend {0:?} (expected \"memory\" or \"rocksdb\")")]
    UnknownBackend(String),
}

/// Key-value store behind the chain store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Memory,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Data directory. Holds the lock file and, for RocksDB, the database.
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
}

impl StorageConfig {
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("LOCK")
    }

    pub fn chaindata_path(&self) -> PathBuf {
        self.data_dir.join("chaindata")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            backend: StorageBackend::Memory,
        }
    }
}

/// Genesis selection at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisConfig {
    /// Genesis file to reconcile against. `None` selects the default network
    /// for an empty store and the stored genesis otherwise.
    pub file: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

//! # Node Container
//!
//! Configuration of the node process.

pub mod config;

pub use config::{ConfigError, GenesisConfig, NodeConfig, StorageBackend, StorageConfig};

//! # Storage Adapters
//!
//! `InMemoryKVStore` is always available. Enable the `rocksdb` feature for
//! the persistent backend:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

pub use qc_02_block_storage::InMemoryKVStore;

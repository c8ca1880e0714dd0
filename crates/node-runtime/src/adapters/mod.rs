//! # Adapters
//!
//! Process-level adapters of the node: the data directory lock and the
//! persistent key-value store behind the chain store.

pub mod lock;
pub mod storage;

pub use lock::{DataDirLock, LockError};

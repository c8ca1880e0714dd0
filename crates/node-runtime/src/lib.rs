//! # Node Runtime Library
//!
//! Genesis construction, chain bootstrap and the process adapters of the
//! node. The binary in `main.rs` wires them together; everything is exposed
//! here for tests.

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod runtime;

pub use container::{NodeConfig, StorageBackend};
pub use runtime::NodeRuntime;

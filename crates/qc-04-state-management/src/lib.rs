//! # qc-04-state-management
//!
//! State Management subsystem for Quantum-Chain.
//!
//! ## Role in System
//!
//! - **Patricia Merkle Trie**: Canonical secure trie. The root depends only on
//!   the key/value content, never on insertion order.
//! - **World State**: `StateDb` applies balance, code, nonce and storage
//!   writes, commits them to a `TrieDatabase` and yields the state root.
//! - **Re-open by Root**: A committed state can be loaded back from its root;
//!   a missing node means the state is unreadable (pruned or partially written).
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Nibbles, trie nodes, the trie itself, account encoding
//! - `ports/` - `TrieDatabase` driven port
//! - `adapters/` - In-memory node database
//! - `service.rs` - `StateDb`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::StateDb;

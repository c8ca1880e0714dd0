//! # Block Storage Engine (qc-02)
//!
//! The Block Storage subsystem is the authoritative persistence layer for the
//! chain database: headers, bodies, total difficulty, receipts, the canonical
//! index, head pointers, chain configurations and genesis allocations. Trie
//! nodes and contract code share the same key-value store.
//!
//! ## Schema
//!
//! | Record | Key | Value |
//! |--------|-----|-------|
//! | Header | `h` + num + hash | RLP header |
//! | Total difficulty | `h` + num + hash + `t` | RLP integer |
//! | Canonical hash | `h` + num + `n` | hash |
//! | Header number | `H` + hash | num (8 bytes BE) |
//! | Body | `b` + num + hash | RLP body |
//! | Receipts | `r` + num + hash | RLP receipt list |
//! | Head pointers | `LastHeader`, `LastBlock`, `LastFast` | hash |
//! | Chain config | `ethereum-config-` + hash | JSON |
//! | Genesis alloc | `ethereum-genesis-` + hash | JSON |
//! | Contract code | `c` + code hash | code |
//! | Trie node | node hash | RLP node |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Key schema and error types
//! - `ports/` - `KeyValueStore` driven port and the in-memory adapter
//! - `service.rs` - `ChainStore` typed accessors and `WriteBatch`
//!
//! ## Usage
//!
//! ```ignore
//! use qc_02_block_storage::{ChainStore, InMemoryKVStore};
//!
//! let mut store = ChainStore::new(InMemoryKVStore::new());
//! let mut batch = store.batch();
//! batch.write_block(&block);
//! batch.write_canonical_hash(block.hash(), 0);
//! store.write(batch)?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{KVStoreError, StorageError};
pub use domain::keys::KeyPrefix;
pub use ports::outbound::{BatchOperation, InMemoryKVStore, KeyValueStore};
pub use service::{ChainStore, WriteBatch};

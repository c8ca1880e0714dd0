//! # Shared Types Crate
//!
//! This crate contains the primitives, block and transaction entities, and the
//! chain configuration used by the genesis bootstrap and priority-transactor
//! subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Canonical Encoding**: Headers and transactions encode with RLP exactly
//!   as every other node on the network does, so hashes agree.
//! - **Value Semantics**: Big integers are `U256` values, never shared handles.

pub mod block;
pub mod chain_config;
pub mod errors;
pub mod primitives;
pub mod serde_helpers;
pub mod transaction;

pub use block::*;
pub use chain_config::*;
pub use errors::*;
pub use primitives::*;
pub use transaction::*;

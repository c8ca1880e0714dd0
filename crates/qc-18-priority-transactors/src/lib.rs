//! # Priority Transactor Registry (qc-18)
//!
//! Resolves, from on-chain contract state, the accounts granted priority
//! transaction privileges (fee waiver, priority ordering).
//!
//! ## Role in System
//!
//! Transaction validation recovers the priority signer of a priority
//! transaction and asks this registry whether that key is authorized at the
//! current block height. The registry contract in force at a height comes from
//! the chain configuration's transition list; its answers come from a bounded
//! static call against the caller's state snapshot. Nothing is cached.
//!
//! ## Resolution Rules
//!
//! | Condition | `resolve_all` | `resolve_one` |
//! |-----------|---------------|---------------|
//! | No registry address at height | empty map | `None` |
//! | No code at registry address | empty map | `None` |
//! | Call or decode failure | `Err` | `None` |
//!
//! The last row is asymmetric on purpose; callers rely on both behaviors.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Transactor entities, the contract ABI codec, errors
//! - `ports/` - `StateView` and `StaticCallExecutor` driven ports
//! - `adapters/` - `StateView` for the in-repo `StateDb`
//! - `service.rs` - `PriorityTransactorRegistry`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::abi::{self, TransactorMeta};
pub use domain::entities::{PriorityTransactor, PriorityTransactorMap};
pub use domain::errors::{AbiError, RegistryError};
pub use ports::outbound::{ExecutionError, StateView, StaticCallExecutor};
pub use service::{PriorityTransactorRegistry, MAX_GAS_LIMIT};

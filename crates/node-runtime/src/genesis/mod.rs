//! # Genesis Module
//!
//! Block zero and chain bootstrap.
//!
//! - `spec`: the declarative genesis and its JSON form
//! - `builder`: header defaults, block construction and the atomic commit
//! - `extra`: validator and signer sets carried in the extra data
//! - `presets`: public networks and the developer chain
//! - `registry`: well-known genesis hashes
//! - `reconcile`: startup reconciliation of store and supplied genesis
//!
//! ## Startup Sequence
//!
//! 1. Read the canonical hash at height 0
//! 2. Commit a genesis if there is none, or if its state is gone
//! 3. Otherwise pick the configuration, apply overrides, check fork order
//! 4. Refuse configuration changes below the local head

pub mod builder;
pub mod errors;
pub mod extra;
pub mod presets;
pub mod reconcile;
pub mod registry;
pub mod spec;

pub use builder::{
    commit_genesis_state, genesis_for_testing, GENESIS_DIFFICULTY, GENESIS_GAS_LIMIT,
    INITIAL_BASE_FEE,
};
pub use errors::GenesisError;
pub use extra::{clique_extra_for_signers, genesis_extra_for_validators, IbftExtra};
pub use reconcile::GenesisReconciler;
pub use registry::{Network, NetworkRegistry};
pub use spec::{GenesisAccount, GenesisAlloc, GenesisSpec};

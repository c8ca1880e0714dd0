//! # Genesis Errors
//!
//! Structural errors (`InvalidGenesisHeight`, `ForkOrder`, `MissingSignerSet`)
//! abort before anything is written. `GenesisMismatch` and
//! `ConfigCompatibility` are operator decisions and carry the data needed to
//! make them.

use qc_02_block_storage::StorageError;
use qc_04_state_management::StateError;
use shared_types::{ChainConfig, ConfigCompatError, ForkOrderError, H256};
use thiserror::Error;

/// Errors raised while building, committing or reconciling a genesis.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// A custom genesis was supplied without a chain configuration.
    #[error("genesis has no chain configuration")]
    MissingConfig,

    /// Only a block at height zero may become the canonical genesis.
    #[error("can't commit genesis block with number > 0 (got {0})")]
    InvalidGenesisHeight(u64),

    #[error(transparent)]
    ForkOrder(#[from] ForkOrderError),

    /// The store already holds a different genesis.
    #[error("database contains incompatible genesis (have {stored:?}, new {new:?})")]
    GenesisMismatch { stored: H256, new: H256 },

    /// Signer-list consensus needs the signers embedded in the extra data.
    #[error("can't start clique chain without signers")]
    MissingSignerSet,

    /// The new configuration would rewrite already accepted history. The
    /// stored configuration was left untouched; `config` is the rejected
    /// candidate for the chain with genesis `genesis`.
    #[error("{error}")]
    ConfigCompatibility {
        error: ConfigCompatError,
        genesis: H256,
        config: Box<ChainConfig>,
    },

    /// Head header hash points at a header without a number record.
    #[error("missing block number for head header hash")]
    MissingHeadNumber,

    /// No persisted allocation and no preset for this genesis.
    #[error("genesis state for {0:?} not found")]
    StateNotFound(H256),

    #[error("invalid genesis extra data: {0}")]
    InvalidExtra(#[from] rlp::DecoderError),

    #[error("genesis encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl GenesisError {
    /// Whether the error leaves the store as it was and asks the operator to
    /// choose between the stored and the supplied chain.
    pub fn is_operator_decision(&self) -> bool {
        matches!(
            self,
            GenesisError::GenesisMismatch { .. } | GenesisError::ConfigCompatibility { .. }
        )
    }
}

//! # Node Runtime
//!
//! Startup of a node on top of a chain store: genesis reconciliation and the
//! resulting chain configuration.

use crate::genesis::{GenesisError, GenesisReconciler, GenesisSpec};
use qc_02_block_storage::{ChainStore, KeyValueStore};
use shared_types::{ChainConfig, ConfigCompatError, ConfigOverrides, H256};
use tracing::{info, warn};

/// A node whose store holds a reconciled genesis.
pub struct NodeRuntime<S: KeyValueStore> {
    store: ChainStore<S>,
    chain_config: ChainConfig,
    genesis_hash: H256,
    pending_rewind: Option<ConfigCompatError>,
}

impl<S: KeyValueStore> NodeRuntime<S> {
    /// Reconcile `store` against `genesis` and `overrides`.
    ///
    /// A configuration that would rewrite local history is not applied: the
    /// node keeps running under the stored configuration and the refused
    /// change is kept in `pending_rewind` for the operator. Every other
    /// reconciliation error is returned.
    pub fn bootstrap(
        mut store: ChainStore<S>,
        reconciler: &GenesisReconciler,
        genesis: Option<&GenesisSpec>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, GenesisError> {
        let (chain_config, genesis_hash, pending_rewind) =
            match reconciler.setup_genesis_block(&mut store, genesis, overrides) {
                Ok((config, hash)) => (config, hash, None),
                Err(GenesisError::ConfigCompatibility {
                    error,
                    genesis,
                    config,
                }) => {
                    warn!(
                        %error,
                        rewind_to = error.rewind_to,
                        "keeping stored chain config, rewind required to apply the new one"
                    );
                    let stored = store.read_chain_config(&genesis)?.unwrap_or(*config);
                    (stored, genesis, Some(error))
                }
                Err(err) => return Err(err),
            };

        info!(
            genesis = ?genesis_hash,
            chain_id = chain_config.chain_id,
            "chain initialised"
        );
        Ok(Self {
            store,
            chain_config,
            genesis_hash,
            pending_rewind,
        })
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    pub fn genesis_hash(&self) -> H256 {
        self.genesis_hash
    }

    /// Configuration change refused at startup, if any.
    pub fn pending_rewind(&self) -> Option<&ConfigCompatError> {
        self.pending_rewind.as_ref()
    }

    pub fn store(&self) -> &ChainStore<S> {
        &self.store
    }

    pub fn into_store(self) -> ChainStore<S> {
        self.store
    }

    /// Release the store.
    pub fn shutdown(self) {
        info!(genesis = ?self.genesis_hash, "node stopped");
    }
}

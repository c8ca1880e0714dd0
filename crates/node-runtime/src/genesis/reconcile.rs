//! # Chain Bootstrap
//!
//! Reconciles the genesis and chain configuration held by the store with the
//! ones supplied at startup.
//!
//! | Store | Supplied genesis | Outcome |
//! |-------|------------------|---------|
//! | empty | any | commit supplied genesis, or the default network |
//! | genesis, state unreadable | any | re-commit if the hashes match, else mismatch |
//! | genesis, state readable | matching or none | upgrade the stored configuration |
//! | genesis | different hash | mismatch, nothing written |
//!
//! A configuration upgrade that changes forks the local head has already
//! passed is refused and reported with the height to rewind to.

use super::errors::GenesisError;
use super::registry::NetworkRegistry;
use super::spec::GenesisSpec;
use qc_02_block_storage::{ChainStore, KeyValueStore};
use qc_04_state_management::StateDb;
use shared_types::{ChainConfig, ConfigOverrides, H256};
use tracing::{debug, info, warn};

/// Startup reconciliation of the stored chain against a genesis.
#[derive(Clone, Debug, Default)]
pub struct GenesisReconciler {
    networks: NetworkRegistry,
}

impl GenesisReconciler {
    pub fn new(networks: NetworkRegistry) -> Self {
        Self { networks }
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Make sure `store` holds a genesis. Returns the configuration to run
    /// with and the genesis hash.
    ///
    /// `genesis` is the operator supplied genesis, if any; it must carry a
    /// configuration. `overrides` are applied on top of whichever
    /// configuration is selected for an existing chain.
    pub fn setup_genesis_block<S: KeyValueStore>(
        &self,
        store: &mut ChainStore<S>,
        genesis: Option<&GenesisSpec>,
        overrides: &ConfigOverrides,
    ) -> Result<(ChainConfig, H256), GenesisError> {
        if genesis.is_some_and(|spec| spec.config.is_none()) {
            return Err(GenesisError::MissingConfig);
        }

        let Some(stored) = store.read_canonical_hash(0)? else {
            let default;
            let spec = match genesis {
                Some(spec) => {
                    info!("writing custom genesis block");
                    spec
                }
                None => {
                    info!("writing default genesis block");
                    default = self.networks.default_spec();
                    &default
                }
            };
            let block = spec.commit(store)?;
            return Ok((spec.config_or_default(), block.hash()));
        };

        if !self.state_readable(store, stored)? {
            let default;
            let spec = match genesis {
                Some(spec) => spec,
                None => {
                    default = self.networks.default_spec();
                    &default
                }
            };
            let hash = spec.hash();
            if hash != stored {
                return Err(GenesisError::GenesisMismatch { stored, new: hash });
            }
            warn!(?stored, "genesis state missing, committing it again");
            let block = spec.commit(store)?;
            return Ok((spec.config_or_default(), block.hash()));
        }

        if let Some(spec) = genesis {
            let hash = spec.hash();
            if hash != stored {
                return Err(GenesisError::GenesisMismatch { stored, new: hash });
            }
        }

        let mut candidate = self.candidate_config(genesis, stored);
        overrides.apply(&mut candidate);
        candidate.check_config_fork_order()?;

        let Some(stored_config) = store.read_chain_config(&stored)? else {
            warn!(?stored, "found genesis block without chain config");
            store.write_chain_config(stored, &candidate)?;
            return Ok((candidate, stored));
        };

        // A private network started without its genesis file keeps running
        // under the configuration it was created with.
        if genesis.is_none() && !self.networks.contains(&stored) {
            debug!(?stored, "keeping stored config of private network");
            candidate = stored_config.clone();
            overrides.apply(&mut candidate);
        }

        let height = match store.read_head_header_hash()? {
            Some(head) => store.read_header_number(&head)?,
            None => None,
        }
        .ok_or(GenesisError::MissingHeadNumber)?;

        if let Some(error) = stored_config.check_compatible(&candidate, height) {
            if height != 0 && error.rewind_to != 0 {
                warn!(
                    %error,
                    height,
                    rewind_to = error.rewind_to,
                    "refusing incompatible chain config"
                );
                return Err(GenesisError::ConfigCompatibility {
                    error,
                    genesis: stored,
                    config: Box::new(candidate),
                });
            }
        }

        store.write_chain_config(stored, &candidate)?;
        info!(?stored, chain_id = candidate.chain_id, height, "chain config up to date");
        Ok((candidate, stored))
    }

    /// Configuration a stored genesis runs under when nothing else is known:
    /// the supplied one, then the known network's, then the fallback.
    fn candidate_config(&self, genesis: Option<&GenesisSpec>, stored: H256) -> ChainConfig {
        genesis
            .and_then(|spec| spec.config.clone())
            .or_else(|| self.networks.config_for(&stored))
            .unwrap_or_else(ChainConfig::all_ethash_protocol_changes)
    }

    fn state_readable<S: KeyValueStore>(
        &self,
        store: &ChainStore<S>,
        genesis: H256,
    ) -> Result<bool, GenesisError> {
        let Some(header) = store.read_header(&genesis, 0)? else {
            return Ok(false);
        };
        Ok(StateDb::open(header.root, store).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::presets;
    use crate::genesis::spec::GenesisAccount;
    use qc_02_block_storage::InMemoryKVStore;
    use shared_types::{Address, Header, U256};

    fn store() -> ChainStore<InMemoryKVStore> {
        ChainStore::new(InMemoryKVStore::new())
    }

    fn no_overrides() -> ConfigOverrides {
        ConfigOverrides::default()
    }

    fn custom(config: ChainConfig) -> GenesisSpec {
        GenesisSpec {
            config: Some(config),
            alloc: [(Address::repeat_byte(0x0a), GenesisAccount::with_balance(U256::exp10(18)))]
                .into_iter()
                .collect(),
            ..Default::default()
        }
    }

    fn private_config() -> ChainConfig {
        ChainConfig {
            chain_id: 4_242,
            london_block: Some(100),
            arrow_glacier_block: None,
            ..ChainConfig::all_ethash_protocol_changes()
        }
    }

    fn advance_head<S: KeyValueStore>(store: &mut ChainStore<S>, height: u64) {
        let header = Header {
            number: height,
            ..Default::default()
        };
        let mut batch = store.batch();
        batch.write_header(&header);
        batch.write_head_header_hash(header.hash());
        store.write(batch).unwrap();
    }

    /// Genesis block and canonical pointer without state or config.
    fn write_bare_genesis<S: KeyValueStore>(store: &mut ChainStore<S>, spec: &GenesisSpec) -> H256 {
        let block = spec.to_block();
        let hash = block.hash();
        let mut batch = store.batch();
        batch.write_block(&block);
        batch.write_canonical_hash(hash, 0);
        batch.write_head_header_hash(hash);
        store.write(batch).unwrap();
        hash
    }

    #[test]
    fn test_empty_store_gets_default_network() {
        let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());
        let mut store = store();

        let (config, hash) = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();

        assert_eq!(hash, presets::mainnet().hash());
        assert_eq!(config, ChainConfig::mainnet());
        assert_eq!(store.read_canonical_hash(0).unwrap(), Some(hash));
    }

    #[test]
    fn test_empty_store_gets_supplied_genesis() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let spec = custom(private_config());

        let (config, hash) = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();

        assert_eq!(hash, spec.hash());
        assert_eq!(config, private_config());
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(private_config()));
    }

    #[test]
    fn test_genesis_without_config_rejected_before_writes() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let spec = GenesisSpec {
            config: None,
            ..custom(private_config())
        };

        assert!(matches!(
            reconciler.setup_genesis_block(&mut store, Some(&spec), &no_overrides()),
            Err(GenesisError::MissingConfig)
        ));
        assert!(store.inner().is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let spec = custom(private_config());

        let first = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();
        let records = store.inner().len();
        let second = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.inner().len(), records);
    }

    #[test]
    fn test_different_genesis_is_a_mismatch() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let stored = custom(private_config()).commit(&mut store).unwrap().hash();

        let different = GenesisSpec {
            timestamp: 1,
            ..custom(private_config())
        };
        let err = reconciler
            .setup_genesis_block(&mut store, Some(&different), &no_overrides())
            .unwrap_err();

        match err {
            GenesisError::GenesisMismatch { stored: have, new } => {
                assert_eq!(have, stored);
                assert_eq!(new, different.hash());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.read_canonical_hash(0).unwrap(), Some(stored));
    }

    #[test]
    fn test_missing_state_is_committed_again() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let spec = custom(private_config());
        let hash = write_bare_genesis(&mut store, &spec);
        let root = spec.to_block().header.root;
        assert!(StateDb::open(root, &store).is_err());

        let (config, reconciled) = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();

        assert_eq!(reconciled, hash);
        assert_eq!(config, private_config());
        let state = StateDb::open(root, &store).unwrap();
        assert_eq!(state.get_balance(&Address::repeat_byte(0x0a)), U256::exp10(18));
    }

    #[test]
    fn test_missing_state_with_other_genesis_is_a_mismatch() {
        let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());
        let mut store = store();
        let hash = write_bare_genesis(&mut store, &custom(private_config()));

        // The default network is tried when nothing is supplied.
        assert!(matches!(
            reconciler.setup_genesis_block(&mut store, None, &no_overrides()),
            Err(GenesisError::GenesisMismatch { stored, .. }) if stored == hash
        ));
    }

    #[test]
    fn test_legacy_store_without_config_gets_one() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let spec = custom(private_config());
        let mut batch = store.batch();
        let block = spec.materialize(&mut batch).unwrap();
        let hash = block.hash();
        batch.write_block(&block);
        batch.write_canonical_hash(hash, 0);
        batch.write_head_header_hash(hash);
        store.write(batch).unwrap();

        let (config, _) = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();

        assert_eq!(config, ChainConfig::all_ethash_protocol_changes());
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(config));
    }

    #[test]
    fn test_private_network_keeps_stored_config() {
        let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();

        let (config, reconciled) = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();

        assert_eq!(reconciled, hash);
        assert_eq!(config, private_config());
    }

    #[test]
    fn test_known_network_uses_preset_config() {
        let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());
        let mut store = store();
        let hash = presets::stagenet().commit(&mut store).unwrap().hash();

        let (config, _) = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();

        assert_eq!(config, ChainConfig::stagenet());
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(ChainConfig::stagenet()));
    }

    #[test]
    fn test_overrides_persist_at_genesis_height() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();
        let overrides = ConfigOverrides {
            arrow_glacier_block: Some(150),
            terminal_total_difficulty: Some(U256::from(1_000)),
        };

        let (config, _) = reconciler
            .setup_genesis_block(&mut store, None, &overrides)
            .unwrap();

        assert_eq!(config.arrow_glacier_block, Some(150));
        assert_eq!(config.terminal_total_difficulty, Some(U256::from(1_000)));
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(config));
    }

    #[test]
    fn test_override_behind_head_is_refused() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();
        advance_head(&mut store, 200);
        let overrides = ConfigOverrides {
            arrow_glacier_block: Some(150),
            ..Default::default()
        };

        match reconciler.setup_genesis_block(&mut store, None, &overrides) {
            Err(GenesisError::ConfigCompatibility { error, genesis, config }) => {
                assert_eq!(error.rewind_to, 149);
                assert_eq!(genesis, hash);
                assert_eq!(config.arrow_glacier_block, Some(150));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(private_config()));
    }

    #[test]
    fn test_rewind_protection_depends_on_height() {
        let reconciler = GenesisReconciler::default();
        let earlier_london = ChainConfig {
            london_block: Some(50),
            ..private_config()
        };
        let upgraded = custom(earlier_london.clone());

        // Same genesis hash: London is not active at block zero in either.
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();
        assert_eq!(upgraded.hash(), hash);

        let (config, _) = reconciler
            .setup_genesis_block(&mut store, Some(&upgraded), &no_overrides())
            .unwrap();
        assert_eq!(config, earlier_london);
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(earlier_london));

        let mut store = self::store();
        custom(private_config()).commit(&mut store).unwrap();
        advance_head(&mut store, 200);

        match reconciler.setup_genesis_block(&mut store, Some(&upgraded), &no_overrides()) {
            Err(GenesisError::ConfigCompatibility { error, .. }) => {
                assert_eq!(error.what, "London fork block");
                assert_eq!(error.rewind_to, 49);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(private_config()));
    }

    #[test]
    fn test_incompatibility_rewinding_to_genesis_is_written() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();
        advance_head(&mut store, 200);

        // A chain id change after EIP158 can only be undone from genesis.
        let renumbered = ChainConfig {
            chain_id: 4_343,
            ..private_config()
        };
        assert_eq!(
            private_config()
                .check_compatible(&renumbered, 200)
                .map(|error| error.rewind_to),
            Some(0)
        );

        let (config, _) = reconciler
            .setup_genesis_block(&mut store, Some(&custom(renumbered.clone())), &no_overrides())
            .unwrap();

        assert_eq!(config, renumbered);
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(renumbered));
    }

    #[test]
    fn test_missing_head_number() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        custom(private_config()).commit(&mut store).unwrap();
        let mut batch = store.batch();
        batch.write_head_header_hash(H256::repeat_byte(0xee));
        store.write(batch).unwrap();

        assert!(matches!(
            reconciler.setup_genesis_block(&mut store, None, &no_overrides()),
            Err(GenesisError::MissingHeadNumber)
        ));
    }

    #[test]
    fn test_misordered_candidate_rejected_without_writes() {
        let reconciler = GenesisReconciler::default();
        let mut store = store();
        let hash = custom(private_config()).commit(&mut store).unwrap().hash();

        let broken = custom(ChainConfig {
            byzantium_block: Some(20),
            constantinople_block: Some(10),
            ..private_config()
        });
        assert!(matches!(
            reconciler.setup_genesis_block(&mut store, Some(&broken), &no_overrides()),
            Err(GenesisError::ForkOrder(_))
        ));
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(private_config()));
    }
}

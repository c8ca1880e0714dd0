//! # Genesis Bootstrap Flows
//!
//! Builder, chain store and reconciler together, across node restarts:
//!
//! 1. **Determinism**: the same genesis yields the same hash in any store
//! 2. **Idempotence**: committing or reconciling twice changes nothing
//! 3. **Mismatch / fork order**: refused before anything is written
//! 4. **Rewind protection**: config changes below the head are refused

#[cfg(test)]
mod tests {
    use crate::fixtures::{chain_config, genesis_with_registry};
    use node_runtime::genesis::{
        presets, GenesisError, GenesisReconciler, GenesisSpec, IbftExtra, NetworkRegistry,
    };
    use proptest::prelude::*;
    use qc_02_block_storage::{ChainStore, InMemoryKVStore, KeyValueStore};
    use qc_04_state_management::StateDb;
    use shared_types::{Address, ChainConfig, ConfigOverrides, Header, U256};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn store() -> ChainStore<InMemoryKVStore> {
        ChainStore::new(InMemoryKVStore::new())
    }

    fn reconciler() -> GenesisReconciler {
        GenesisReconciler::new(NetworkRegistry::with_defaults())
    }

    fn no_overrides() -> ConfigOverrides {
        ConfigOverrides::default()
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

    /// London scheduled after genesis so that moving it keeps the genesis
    /// hash unchanged.
    fn late_london(london: u64) -> ChainConfig {
        ChainConfig {
            london_block: Some(london),
            arrow_glacier_block: None,
            ..chain_config(0)
        }
    }

    const GENESIS_JSON: &str = r#"{
        "config": { "chainId": 1337, "homesteadBlock": 0, "eip150Block": 0,
                    "eip155Block": 0, "eip158Block": 0, "byzantiumBlock": 0,
                    "constantinopleBlock": 0, "petersburgBlock": 0,
                    "istanbulBlock": 0, "berlinBlock": 0, "londonBlock": 0 },
        "timestamp": "0x65a1b2c3",
        "gasLimit": 30000000,
        "difficulty": "1",
        "extraData": "0x00",
        "alloc": {
            "0x1000000000000000000000000000000000000001": { "balance": "0x3635c9adc5dea00000" },
            "2000000000000000000000000000000000000002": {
                "balance": "0",
                "code": "0x6001600055",
                "storage": { "0x00": "0x01" }
            }
        }
    }"#;

    // =========================================================================
    // DETERMINISM
    // =========================================================================

    #[test]
    fn test_same_genesis_same_hash_in_every_store() {
        let first = GenesisSpec::from_json(GENESIS_JSON.as_bytes()).unwrap();
        let second = GenesisSpec::from_json(GENESIS_JSON.as_bytes()).unwrap();

        let mut a = store();
        let mut b = store();
        let block_a = first.commit(&mut a).unwrap();
        let block_b = second.commit(&mut b).unwrap();

        assert_eq!(block_a.hash(), block_b.hash());
        assert_eq!(block_a.header.root, block_b.header.root);
        assert_eq!(first.hash(), block_a.hash());
    }

    #[test]
    fn test_preset_hashes_are_stable() {
        assert_eq!(presets::mainnet().hash(), presets::mainnet().hash());
        let registry = NetworkRegistry::with_defaults();
        for name in ["mainnet", "testnet", "stagenet"] {
            let network = registry.by_name(name).unwrap();
            let mut store = store();
            assert_eq!(network.spec.commit(&mut store).unwrap().hash(), network.hash);
        }
    }

    proptest! {
        #[test]
        fn prop_alloc_order_and_prefix_do_not_change_hash(
            balances in proptest::collection::btree_map(1u8..=255, 1u64.., 1..12)
        ) {
            let entry = |(byte, balance): (&u8, &u64), prefix: &str| {
                format!(r#""{prefix}{}": {{ "balance": "{balance}" }}"#, hex_address(*byte))
            };
            let forward: Vec<String> = balances.iter().map(|e| entry(e, "0x")).collect();
            let backward: Vec<String> = balances.iter().rev().map(|e| entry(e, "")).collect();

            let parse = |entries: Vec<String>| {
                let raw = format!(
                    r#"{{ "config": {{ "chainId": 1 }}, "alloc": {{ {} }} }}"#,
                    entries.join(",")
                );
                GenesisSpec::from_json(raw.as_bytes()).unwrap()
            };
            prop_assert_eq!(parse(forward).hash(), parse(backward).hash());
        }
    }

    fn hex_address(byte: u8) -> String {
        format!("{:02x}", byte).repeat(20)
    }

    // =========================================================================
    // IDEMPOTENCE
    // =========================================================================

    #[test]
    fn test_commit_twice_yields_same_hash() {
        let spec = genesis_with_registry(chain_config(0), &[Address::repeat_byte(0x01)]);
        let mut store = store();

        let first = spec.commit(&mut store).unwrap();
        let second = spec.commit(&mut store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reconcile_across_restarts() {
        let spec = genesis_with_registry(chain_config(0), &[Address::repeat_byte(0x01)]);
        let mut store = store();
        let reconciler = reconciler();

        let initial = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();
        let with_file = reconciler
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap();
        let without_file = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();

        assert_eq!(initial, with_file);
        assert_eq!(initial, without_file);
        assert_eq!(initial.0, chain_config(0));
    }

    #[test]
    fn test_stagenet_restart_reads_validators_back() {
        let mut store = store();
        let reconciler = reconciler();
        let (_, hash) = reconciler
            .setup_genesis_block(&mut store, Some(&presets::stagenet()), &no_overrides())
            .unwrap();

        let (config, restarted) = reconciler
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();
        assert_eq!(restarted, hash);
        assert_eq!(config, ChainConfig::stagenet());

        let header = store.read_header(&hash, 0).unwrap().unwrap();
        let extra = IbftExtra::decode(&header.extra).unwrap();
        assert_eq!(extra.validators.len(), 5);
    }

    // =========================================================================
    // REFUSALS
    // =========================================================================

    #[test]
    fn test_mismatch_leaves_store_untouched() {
        let mut store = store();
        let (config, hash) = reconciler()
            .setup_genesis_block(&mut store, None, &no_overrides())
            .unwrap();
        let records = store.inner().len();

        let err = reconciler()
            .setup_genesis_block(&mut store, Some(&presets::testnet()), &no_overrides())
            .unwrap_err();

        assert!(err.is_operator_decision());
        assert!(matches!(
            err,
            GenesisError::GenesisMismatch { stored, new }
                if stored == hash && new == presets::testnet().hash()
        ));
        assert_eq!(store.inner().len(), records);
        assert_eq!(store.read_chain_config(&hash).unwrap(), Some(config));
    }

    #[test]
    fn test_fork_order_rejected_before_any_write() {
        let spec = genesis_with_registry(
            ChainConfig {
                istanbul_block: Some(10),
                berlin_block: Some(5),
                ..late_london(20)
            },
            &[],
        );
        let mut store = store();

        let err = reconciler()
            .setup_genesis_block(&mut store, Some(&spec), &no_overrides())
            .unwrap_err();

        assert!(matches!(err, GenesisError::ForkOrder(_)));
        assert!(!err.is_operator_decision());
        assert!(store.inner().is_empty());
    }

    // =========================================================================
    // REWIND PROTECTION
    // =========================================================================

    #[test]
    fn test_rewind_protection() {
        let original = genesis_with_registry(late_london(1_000), &[]);
        let upgraded = genesis_with_registry(late_london(400), &[]);
        assert_eq!(original.hash(), upgraded.hash());

        // Head at genesis: nothing to rewind, the new schedule is stored.
        let mut fresh = store();
        let (_, hash) = reconciler()
            .setup_genesis_block(&mut fresh, Some(&original), &no_overrides())
            .unwrap();
        let (config, _) = reconciler()
            .setup_genesis_block(&mut fresh, Some(&upgraded), &no_overrides())
            .unwrap();
        assert_eq!(config.london_block, Some(400));
        assert_eq!(fresh.read_chain_config(&hash).unwrap(), Some(late_london(400)));

        // Head past the new activation: refused, stored schedule kept.
        let mut synced = store();
        reconciler()
            .setup_genesis_block(&mut synced, Some(&original), &no_overrides())
            .unwrap();
        advance_head(&mut synced, 600);

        match reconciler().setup_genesis_block(&mut synced, Some(&upgraded), &no_overrides()) {
            Err(GenesisError::ConfigCompatibility { error, genesis, .. }) => {
                assert_eq!(genesis, hash);
                assert_eq!(error.rewind_to, 399);
                assert_ne!(error.rewind_to, 0);
            }
            other => panic!("expected ConfigCompatibility, got {other:?}"),
        }
        assert_eq!(synced.read_chain_config(&hash).unwrap(), Some(late_london(1_000)));

        // Head still below the new activation: accepted.
        let mut early = store();
        reconciler()
            .setup_genesis_block(&mut early, Some(&original), &no_overrides())
            .unwrap();
        advance_head(&mut early, 300);
        assert!(reconciler()
            .setup_genesis_block(&mut early, Some(&upgraded), &no_overrides())
            .is_ok());
    }

    #[test]
    fn test_registry_account_is_in_committed_state() {
        let spec = genesis_with_registry(chain_config(0), &[Address::repeat_byte(0x01)]);
        let mut store = store();
        let block = spec.commit(&mut store).unwrap();

        let state = StateDb::open(block.header.root, &store).unwrap();
        assert_eq!(state.get_code(&crate::fixtures::REGISTRY_ADDRESS), crate::fixtures::REGISTRY_CODE);
        assert_eq!(state.get_balance(&Address::repeat_byte(0x01)), U256::exp10(21));
    }
}

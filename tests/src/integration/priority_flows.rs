//! # Priority Transaction Flows
//!
//! Signer recovery and registry resolution together:
//!
//! 1. A priority transaction carries two independently recovered signers
//! 2. The priority signer's public key is looked up in the registry contract
//!    deployed in genesis state
//! 3. Registry absence and registry failure behave as documented

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        chain_config, genesis_with_registry, priority_transfer, public_key, signed_priority_transfer,
        signing_key, RegistryContract, CHAIN_ID, REGISTRY_ADDRESS,
    };
    use qc_02_block_storage::{ChainStore, InMemoryKVStore};
    use qc_04_state_management::StateDb;
    use qc_10_signature_verification::{SignatureError, TxSigner};
    use qc_18_priority_transactors::{
        PriorityTransactor, PriorityTransactorRegistry, RegistryError, StateView,
    };
    use shared_types::{
        Address, ChainConfig, ContractTransition, InnerTx, Transaction, TxData, U256,
    };

    fn alice_and_bob() -> RegistryContract {
        RegistryContract::new(&[
            (public_key(1), true, "Alice"),
            (public_key(2), false, "Bob"),
        ])
    }

    /// Genesis state with the registry contract deployed.
    fn genesis_state(config: ChainConfig) -> StateDb {
        let spec = genesis_with_registry(config, &[public_key(7).address()]);
        let mut store = ChainStore::new(InMemoryKVStore::new());
        let block = spec.commit(&mut store).unwrap();
        StateDb::open(block.header.root, &store).unwrap()
    }

    // =========================================================================
    // REGISTRY ABSENCE
    // =========================================================================

    #[test]
    fn test_unscheduled_registry_is_empty() {
        let config = ChainConfig {
            priority_transactors_contracts: Vec::new(),
            ..chain_config(0)
        };
        let state = genesis_state(config.clone());
        let evm = alice_and_bob();
        let registry = PriorityTransactorRegistry::new(&config);

        assert!(registry.resolve_all(10, &state, &evm).unwrap().is_empty());
        assert_eq!(registry.resolve_one(10, &public_key(1), &state, &evm), None);
        assert_eq!(evm.calls(), 0);
    }

    #[test]
    fn test_registry_before_activation_is_empty() {
        let config = chain_config(100);
        let state = genesis_state(config.clone());
        let evm = alice_and_bob();
        let registry = PriorityTransactorRegistry::new(&config);

        assert!(registry.resolve_all(99, &state, &evm).unwrap().is_empty());
        assert_eq!(registry.resolve_one(99, &public_key(1), &state, &evm), None);
        assert_eq!(registry.resolve_all(100, &state, &evm).unwrap().len(), 2);
    }

    #[test]
    fn test_undeployed_registry_is_empty() {
        let elsewhere = Address::repeat_byte(0x77);
        let config = ChainConfig {
            priority_transactors_contracts: vec![ContractTransition {
                block: 0,
                address: elsewhere,
            }],
            ..chain_config(0)
        };
        let state = genesis_state(config.clone());
        assert!(!state.has_code(&elsewhere));

        let evm = alice_and_bob();
        let registry = PriorityTransactorRegistry::new(&config);
        assert!(registry.resolve_all(1, &state, &evm).unwrap().is_empty());
        assert_eq!(registry.resolve_one(1, &public_key(1), &state, &evm), None);
        assert_eq!(evm.calls(), 0);
    }

    // =========================================================================
    // RESOLUTION OVER GENESIS STATE
    // =========================================================================

    #[test]
    fn test_resolve_all_from_genesis_state() {
        let config = chain_config(0);
        let state = genesis_state(config.clone());
        assert!(state.has_code(&REGISTRY_ADDRESS));

        let transactors = PriorityTransactorRegistry::new(&config)
            .resolve_all(1, &state, &alice_and_bob())
            .unwrap();

        assert_eq!(transactors.len(), 2);
        assert_eq!(
            transactors[&public_key(1)],
            PriorityTransactor {
                entity_name: "Alice".to_string(),
                is_gas_price_waiver: true,
            }
        );
        assert_eq!(transactors[&public_key(2)].entity_name, "Bob");
        assert!(!transactors[&public_key(2)].is_gas_price_waiver);
    }

    #[test]
    fn test_resolve_one_known_and_unknown() {
        let config = chain_config(0);
        let state = genesis_state(config.clone());
        let evm = alice_and_bob();
        let registry = PriorityTransactorRegistry::new(&config);

        let bob = registry.resolve_one(1, &public_key(2), &state, &evm).unwrap();
        assert_eq!(bob.entity_name, "Bob");
        assert!(!bob.is_gas_price_waiver);

        assert_eq!(registry.resolve_one(1, &public_key(3), &state, &evm), None);
    }

    #[test]
    fn test_failure_asymmetry() {
        let config = chain_config(0);
        let state = genesis_state(config.clone());
        let evm = RegistryContract::reverting();
        let registry = PriorityTransactorRegistry::new(&config);

        assert!(matches!(
            registry.resolve_all(1, &state, &evm),
            Err(RegistryError::ContractCall(_))
        ));
        assert_eq!(registry.resolve_one(1, &public_key(1), &state, &evm), None);
        assert_eq!(evm.calls(), 2);
    }

    // =========================================================================
    // PRIORITY TRANSACTIONS
    // =========================================================================

    #[test]
    fn test_copy_is_isolated() {
        let original = TxData::Priority(priority_transfer(3, Address::repeat_byte(0xbe)));
        let mut copy = original.copy();

        copy.as_priority_mut().unwrap().gas_fee_cap = U256::from(1);
        copy.as_priority_mut().unwrap().value = U256::zero();

        assert_eq!(original.gas_fee_cap(), U256::from(50_000_000_000u64));
        assert_eq!(original.value(), U256::exp10(18));
        assert_eq!(copy.gas_fee_cap(), U256::one());
    }

    #[test]
    fn test_two_signers_survive_the_wire() {
        let sender = signing_key(1);
        let transactor = signing_key(2);
        let tx = signed_priority_transfer(&sender, &transactor);

        let decoded = Transaction::decode_envelope(&Transaction::new(tx.clone()).encode_envelope())
            .unwrap()
            .into_inner();
        assert_eq!(decoded, tx);

        let (from, priority_key) = TxSigner::new(CHAIN_ID)
            .recover_priority_signers(&decoded)
            .unwrap();
        assert_eq!(from, public_key(1).address());
        assert_eq!(priority_key, public_key(2));
        assert_ne!(from, priority_key.address());
    }

    #[test]
    fn test_wrong_chain_is_rejected() {
        let tx = signed_priority_transfer(&signing_key(1), &signing_key(2));
        assert!(matches!(
            TxSigner::new(CHAIN_ID + 1).recover_priority_signers(&tx),
            Err(SignatureError::ChainIdMismatch { .. })
        ));
    }

    #[test]
    fn test_priority_signer_is_authorized() {
        let config = chain_config(0);
        let state = genesis_state(config.clone());
        let evm = alice_and_bob();
        let registry = PriorityTransactorRegistry::new(&config);
        let signer = TxSigner::new(CHAIN_ID);

        let sponsored = signed_priority_transfer(&signing_key(9), &signing_key(1));
        let (_, key) = signer.recover_priority_signers(&sponsored).unwrap();
        let transactor = registry.resolve_one(1, &key, &state, &evm).unwrap();
        assert_eq!(transactor.entity_name, "Alice");
        assert!(transactor.is_gas_price_waiver);

        let unsponsored = signed_priority_transfer(&signing_key(9), &signing_key(4));
        let (_, key) = signer.recover_priority_signers(&unsponsored).unwrap();
        assert_eq!(registry.resolve_one(1, &key, &state, &evm), None);
    }
}

//! # Test Fixtures
//!
//! Keys, chain configurations and a registry contract double shared by the
//! integration flows and the benchmarks.

use node_runtime::genesis::{GenesisAccount, GenesisAlloc, GenesisSpec};
use qc_10_signature_verification::{public_key_of, SigningKey, TxSigner};
use qc_18_priority_transactors::abi::{self, TransactorMeta, GET_TRANSACTORS, GET_TRANSACTOR_BY_KEY};
use qc_18_priority_transactors::{ExecutionError, StaticCallExecutor};
use shared_types::{
    Address, ChainConfig, ContractTransition, PriorityTx, PublicKey, TxData, H160, U256,
};
use std::cell::Cell;

pub const CHAIN_ID: u64 = 1337;

/// Where the registry contract is deployed.
pub const REGISTRY_ADDRESS: Address = H160([0x18; 20]);

/// Stand-in runtime code for the registry contract.
pub const REGISTRY_CODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52, 0x00];

/// Deterministic secp256k1 key.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).expect("non-zero seed below the curve order")
}

pub fn public_key(seed: u8) -> PublicKey {
    public_key_of(&signing_key(seed)).expect("fixture key")
}

/// Fully upgraded chain whose registry contract is scheduled at
/// `registry_from`.
pub fn chain_config(registry_from: u64) -> ChainConfig {
    ChainConfig {
        chain_id: CHAIN_ID,
        priority_transactors_contracts: vec![ContractTransition {
            block: registry_from,
            address: REGISTRY_ADDRESS,
        }],
        ..ChainConfig::all_ethash_protocol_changes()
    }
}

/// Genesis deploying the registry contract and funding `funded`.
pub fn genesis_with_registry(config: ChainConfig, funded: &[Address]) -> GenesisSpec {
    let mut alloc: GenesisAlloc = funded
        .iter()
        .map(|address| (*address, GenesisAccount::with_balance(U256::exp10(21))))
        .collect();
    alloc.insert(
        REGISTRY_ADDRESS,
        GenesisAccount {
            code: REGISTRY_CODE.to_vec(),
            balance: U256::zero(),
            ..Default::default()
        },
    );
    GenesisSpec {
        config: Some(config),
        gas_limit: 30_000_000,
        difficulty: Some(U256::one()),
        alloc,
        ..Default::default()
    }
}

/// Unsigned priority transfer.
pub fn priority_transfer(nonce: u64, to: Address) -> PriorityTx {
    PriorityTx {
        chain_id: U256::from(CHAIN_ID),
        nonce,
        gas_tip_cap: U256::from(2_000_000_000u64),
        gas_fee_cap: U256::from(50_000_000_000u64),
        gas: 21_000,
        to: Some(to),
        value: U256::exp10(18),
        ..Default::default()
    }
}

/// Priority transfer signed by `sender` and countersigned by `transactor`.
pub fn signed_priority_transfer(sender: &SigningKey, transactor: &SigningKey) -> TxData {
    let signer = TxSigner::new(CHAIN_ID);
    let mut tx = TxData::Priority(priority_transfer(0, Address::repeat_byte(0xbe)));
    signer.sign(&mut tx, sender).expect("sender signature");
    let priority = tx.as_priority_mut().expect("priority variant");
    signer.sign_priority(priority, transactor).expect("priority signature");
    tx
}

/// Registry contract double. Answers `getTransactors()` and
/// `getTransactorByKey(string)` from a fixed table; unknown keys revert.
#[derive(Debug, Default)]
pub struct RegistryContract {
    transactors: Vec<TransactorMeta>,
    revert_all: bool,
    calls: Cell<usize>,
}

impl RegistryContract {
    pub fn new(entries: &[(PublicKey, bool, &str)]) -> Self {
        Self {
            transactors: entries
                .iter()
                .map(|(key, waiver, name)| TransactorMeta {
                    public_key: key.to_unprefixed_hex(),
                    is_gas_price_waiver: *waiver,
                    name: (*name).to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Every call reverts.
    pub fn reverting() -> Self {
        Self {
            revert_all: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl StaticCallExecutor for RegistryContract {
    fn static_call(
        &self,
        _caller: Address,
        to: Address,
        input: &[u8],
        _gas: u64,
    ) -> Result<Vec<u8>, ExecutionError> {
        self.calls.set(self.calls.get() + 1);
        if self.revert_all {
            return Err(ExecutionError::Reverted(Vec::new()));
        }
        if to != REGISTRY_ADDRESS {
            return Ok(Vec::new());
        }
        if input == abi::encode_call(GET_TRANSACTORS) {
            return Ok(abi::encode_transactors(&self.transactors));
        }
        self.transactors
            .iter()
            .find(|meta| input == abi::encode_call_with_string(GET_TRANSACTOR_BY_KEY, &meta.public_key))
            .map(abi::encode_transactor)
            .ok_or_else(|| ExecutionError::Reverted(b"unknown transactor".to_vec()))
    }
}

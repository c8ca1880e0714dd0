//! # Genesis Specification
//!
//! Declarative description of block zero, in the JSON layout used by genesis
//! files:
//!
//! ```json
//! {
//!   "config": { "chainId": 1337, "londonBlock": 0 },
//!   "gasLimit": "0x47b760",
//!   "difficulty": "1",
//!   "alloc": { "7e5f4552091a69125d5dfcb7b8c2659029395bdf": { "balance": "1000" } }
//! }
//! ```

use qc_04_state_management::{StateDb, StateError, TrieDatabase};
use serde::{Deserialize, Serialize};
use shared_types::serde_helpers::{
    bytes_hex, option_u256_hex_or_decimal, storage_map, u256_hex_or_decimal, u64_hex_or_decimal,
};
use shared_types::{Address, ChainConfig, H256, U256};
use std::collections::BTreeMap;

/// One pre-funded account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisAccount {
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "bytes_hex")]
    pub code: Vec<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", with = "storage_map")]
    pub storage: BTreeMap<H256, H256>,
    #[serde(with = "u256_hex_or_decimal")]
    pub balance: U256,
    #[serde(default, skip_serializing_if = "is_zero", with = "u64_hex_or_decimal")]
    pub nonce: u64,
    /// Test-only key material. Never part of the state.
    #[serde(default, rename = "secretKey", skip_serializing_if = "Option::is_none")]
    pub private_key: Option<H256>,
}

impl GenesisAccount {
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Allocation table of a genesis. Keys are sorted, but the resulting state
/// root does not depend on the order accounts are applied in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenesisAlloc(#[serde(with = "alloc_map")] pub BTreeMap<Address, GenesisAccount>);

impl GenesisAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, account: GenesisAccount) -> Option<GenesisAccount> {
        self.0.insert(address, account)
    }

    pub fn get(&self, address: &Address) -> Option<&GenesisAccount> {
        self.0.get(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &GenesisAccount)> {
        self.0.iter()
    }

    /// Fresh state holding every allocated account.
    pub fn to_state(&self) -> StateDb {
        let mut state = StateDb::new();
        for (address, account) in self.iter() {
            apply_account(&mut state, address, account);
        }
        state
    }

    /// Write the allocation into `db` and return the state root.
    pub fn flush<D: TrieDatabase + ?Sized>(&self, db: &mut D) -> Result<H256, StateError> {
        self.to_state().commit(db)
    }
}

impl FromIterator<(Address, GenesisAccount)> for GenesisAlloc {
    fn from_iter<I: IntoIterator<Item = (Address, GenesisAccount)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn apply_account(state: &mut StateDb, address: &Address, account: &GenesisAccount) {
    state.add_balance(address, account.balance);
    state.set_code(address, account.code.clone());
    state.set_nonce(address, account.nonce);
    for (key, value) in &account.storage {
        state.set_state(address, *key, *value);
    }
}

/// Addresses as map keys, with or without the `0x` prefix.
mod alloc_map {
    use super::GenesisAccount;
    use serde::de::{self, Deserializer};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Deserialize;
    use shared_types::{decode_hex, Address};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<Address, GenesisAccount>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (address, account) in value {
            map.serialize_entry(&format!("{address:?}"), account)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Address, GenesisAccount>, D::Error> {
        let raw = BTreeMap::<String, GenesisAccount>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, account)| {
                let bytes = decode_hex(&key).map_err(de::Error::custom)?;
                if bytes.len() != Address::len_bytes() {
                    return Err(de::Error::custom(format!("invalid alloc address {key:?}")));
                }
                Ok((Address::from_slice(&bytes), account))
            })
            .collect()
    }
}

/// Declarative genesis block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ChainConfig>,
    #[serde(default, with = "u64_hex_or_decimal")]
    pub nonce: u64,
    #[serde(default, with = "u64_hex_or_decimal")]
    pub timestamp: u64,
    #[serde(default, with = "bytes_hex")]
    pub extra_data: Vec<u8>,
    #[serde(default, with = "u64_hex_or_decimal")]
    pub gas_limit: u64,
    #[serde(default, with = "option_u256_hex_or_decimal")]
    pub difficulty: Option<U256>,
    #[serde(default)]
    pub mix_hash: H256,
    #[serde(default)]
    pub coinbase: Address,
    #[serde(default)]
    pub alloc: GenesisAlloc,

    // Only set for derived or test headers.
    #[serde(default, with = "u64_hex_or_decimal")]
    pub number: u64,
    #[serde(default, with = "u64_hex_or_decimal")]
    pub gas_used: u64,
    #[serde(default)]
    pub parent_hash: H256,
    #[serde(
        default,
        rename = "baseFeePerGas",
        with = "option_u256_hex_or_decimal"
    )]
    pub base_fee: Option<U256>,
}

impl GenesisSpec {
    /// Parse a genesis file.
    pub fn from_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// The genesis configuration, or the permissive fallback when unset.
    pub fn config_or_default(&self) -> ChainConfig {
        self.config
            .clone()
            .unwrap_or_else(ChainConfig::all_ethash_protocol_changes)
    }
}

//! # Priority Transactor Registry
//!
//! Stateless resolution against a caller-supplied snapshot. Safe to call
//! concurrently; nothing is cached between calls.

use crate::domain::abi::{self, GET_TRANSACTORS, GET_TRANSACTOR_BY_KEY};
use crate::domain::entities::{PriorityTransactor, PriorityTransactorMap};
use crate::domain::errors::RegistryError;
use crate::ports::outbound::{StateView, StaticCallExecutor};
use shared_types::{Address, ChainConfig, PublicKey};
use tracing::{debug, trace, warn};

/// Gas ceiling for registry calls.
pub const MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;

/// Registry lookups for one chain configuration.
#[derive(Debug, Clone, Copy)]
pub struct PriorityTransactorRegistry<'a> {
    config: &'a ChainConfig,
}

impl<'a> PriorityTransactorRegistry<'a> {
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// Registry contract to call at `block_number`, if one is deployed.
    fn contract<V>(&self, block_number: u64, state: &V) -> Option<Address>
    where
        V: StateView + ?Sized,
    {
        let address = self.config.priority_transactors_contract_address(block_number);
        if address.is_zero() {
            trace!(block_number, "no priority transactor contract scheduled");
            return None;
        }
        if !state.has_code(&address) {
            debug!(?address, block_number, "priority transactor contract not deployed yet");
            return None;
        }
        Some(address)
    }

    /// Every registered transactor at `block_number`.
    ///
    /// An unscheduled or undeployed registry is an empty map. Call and decode
    /// failures are errors. A malformed key does not fail the batch; it is
    /// parsed leniently and logged.
    pub fn resolve_all<V, E>(
        &self,
        block_number: u64,
        state: &V,
        evm: &E,
    ) -> Result<PriorityTransactorMap, RegistryError>
    where
        V: StateView + ?Sized,
        E: StaticCallExecutor + ?Sized,
    {
        let mut result = PriorityTransactorMap::new();
        let Some(address) = self.contract(block_number, state) else {
            return Ok(result);
        };

        let input = abi::encode_call(GET_TRANSACTORS);
        let output = evm.static_call(address, address, &input, MAX_GAS_LIMIT)?;
        for meta in abi::decode_transactors(&output)? {
            if let Err(e) = PublicKey::from_hex(&meta.public_key) {
                warn!(?address, key = %meta.public_key, error = %e, "malformed transactor key");
            }
            let key = PublicKey::from_hex_lossy(&meta.public_key);
            result.insert(
                key,
                PriorityTransactor {
                    entity_name: meta.name,
                    is_gas_price_waiver: meta.is_gas_price_waiver,
                },
            );
        }
        debug!(?address, block_number, count = result.len(), "resolved priority transactors");
        Ok(result)
    }

    /// The transactor registered under `public_key`, or `None`.
    ///
    /// Unlike `resolve_all`, a failed call or an undecodable response is
    /// reported as `None`.
    pub fn resolve_one<V, E>(
        &self,
        block_number: u64,
        public_key: &PublicKey,
        state: &V,
        evm: &E,
    ) -> Option<PriorityTransactor>
    where
        V: StateView + ?Sized,
        E: StaticCallExecutor + ?Sized,
    {
        let address = self.contract(block_number, state)?;

        let input = abi::encode_call_with_string(GET_TRANSACTOR_BY_KEY, &public_key.to_unprefixed_hex());
        let output = match evm.static_call(address, address, &input, MAX_GAS_LIMIT) {
            Ok(output) => output,
            Err(e) => {
                debug!(?address, %public_key, error = %e, "priority transactor lookup failed");
                return None;
            }
        };
        match abi::decode_transactor(&output) {
            Ok(meta) => Some(PriorityTransactor {
                entity_name: meta.name,
                is_gas_price_waiver: meta.is_gas_price_waiver,
            }),
            Err(e) => {
                debug!(?address, %public_key, error = %e, "priority transactor response undecodable");
                None
            }
        }
    }
}

//! # Chain Configuration
//!
//! Protocol-rule activation heights and consensus parameters of a chain,
//! persisted as JSON next to the genesis hash.
//!
//! ## Height-Indexed Lookups
//!
//! - `is_*` predicates answer whether a fork is active at a height.
//! - `priority_transactors_contract_address` maps a height to the registry
//!   contract in force at that height (the contract may be redeployed).

use crate::errors::{ConfigCompatError, ForkOrderError};
use crate::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Chain id of the main network.
pub const MAINNET_CHAIN_ID: u64 = 52014;
/// Chain id of the public test network.
pub const TESTNET_CHAIN_ID: u64 = 5201420;
/// Chain id of the staging network.
pub const STAGENET_CHAIN_ID: u64 = 5201421;
/// Chain id used by the permissive fallback configurations.
pub const DEVELOPER_CHAIN_ID: u64 = 1337;

/// Signer-list proof-of-authority parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueConfig {
    /// Seconds between blocks.
    pub period: u64,
    /// Epoch length after which votes are reset.
    pub epoch: u64,
}

/// BFT consensus parameters. Only the genesis validator encoding is handled
/// in this workspace; the values are carried for the consensus engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IbftConfig {
    pub block_period_seconds: u64,
    pub epoch_length: u64,
    pub request_timeout_seconds: u64,
}

impl Default for IbftConfig {
    fn default() -> Self {
        Self {
            block_period_seconds: 5,
            epoch_length: 30_000,
            request_timeout_seconds: 10,
        }
    }
}

/// Activation of a priority transactor registry contract at a given height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTransition {
    pub block: u64,
    pub address: Address,
}

/// Explicit override parameters applied on top of any candidate configuration
/// during bootstrap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub arrow_glacier_block: Option<u64>,
    pub terminal_total_difficulty: Option<U256>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.arrow_glacier_block.is_none() && self.terminal_total_difficulty.is_none()
    }

    pub fn apply(&self, config: &mut ChainConfig) {
        if let Some(block) = self.arrow_glacier_block {
            config.arrow_glacier_block = Some(block);
        }
        if let Some(ttd) = self.terminal_total_difficulty {
            config.terminal_total_difficulty = Some(ttd);
        }
    }
}

/// Core configuration of a chain. `None` fork heights mean "never active".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homestead_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip150_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip155_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip158_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byzantium_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constantinople_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub petersburg_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub istanbul_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muir_glacier_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berlin_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub london_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_glacier_block: Option<u64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serde_helpers::option_u256_hex_or_decimal"
    )]
    pub terminal_total_difficulty: Option<U256>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clique: Option<CliqueConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibft: Option<IbftConfig>,

    /// Registry contract transitions, ordered by activation height.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority_transactors_contracts: Vec<ContractTransition>,
}

struct Fork {
    name: &'static str,
    block: Option<u64>,
    optional: bool,
}

fn is_forked(fork: Option<u64>, head: u64) -> bool {
    matches!(fork, Some(block) if block <= head)
}

fn is_fork_incompatible(stored: Option<u64>, new: Option<u64>, head: u64) -> bool {
    (is_forked(stored, head) || is_forked(new, head)) && stored != new
}

fn compat_error(what: &'static str, stored: Option<u64>, new: Option<u64>) -> ConfigCompatError {
    let rewind = match (stored, new) {
        (None, new) => new,
        (Some(s), Some(n)) if s >= n => Some(n),
        (stored, _) => stored,
    };
    ConfigCompatError {
        what,
        stored,
        new,
        rewind_to: match rewind {
            Some(block) if block > 0 => block - 1,
            _ => 0,
        },
    }
}

impl ChainConfig {
    pub fn is_homestead(&self, number: u64) -> bool {
        is_forked(self.homestead_block, number)
    }

    pub fn is_eip155(&self, number: u64) -> bool {
        is_forked(self.eip155_block, number)
    }

    pub fn is_eip158(&self, number: u64) -> bool {
        is_forked(self.eip158_block, number)
    }

    pub fn is_berlin(&self, number: u64) -> bool {
        is_forked(self.berlin_block, number)
    }

    /// Whether the base-fee market is active at `number`.
    pub fn is_london(&self, number: u64) -> bool {
        is_forked(self.london_block, number)
    }

    pub fn is_arrow_glacier(&self, number: u64) -> bool {
        is_forked(self.arrow_glacier_block, number)
    }

    /// Address of the priority transactor registry in force at `number`, or
    /// the zero address before the first transition.
    pub fn priority_transactors_contract_address(&self, number: u64) -> Address {
        self.priority_transactors_contracts
            .iter()
            .take_while(|transition| transition.block <= number)
            .last()
            .map(|transition| transition.address)
            .unwrap_or_default()
    }

    fn forks(&self) -> [Fork; 12] {
        let fork = |name, block, optional| Fork { name, block, optional };
        [
            fork("homesteadBlock", self.homestead_block, false),
            fork("eip150Block", self.eip150_block, false),
            fork("eip155Block", self.eip155_block, false),
            fork("eip158Block", self.eip158_block, false),
            fork("byzantiumBlock", self.byzantium_block, false),
            fork("constantinopleBlock", self.constantinople_block, false),
            fork("petersburgBlock", self.petersburg_block, false),
            fork("istanbulBlock", self.istanbul_block, false),
            fork("muirGlacierBlock", self.muir_glacier_block, true),
            fork("berlinBlock", self.berlin_block, false),
            fork("londonBlock", self.london_block, false),
            fork("arrowGlacierBlock", self.arrow_glacier_block, true),
        ]
    }

    /// Check that fork activation heights never decrease and that no fork is
    /// scheduled after a mandatory predecessor that is disabled. Optional
    /// forks may be skipped without breaking the chain of predecessors.
    pub fn check_config_fork_order(&self) -> Result<(), ForkOrderError> {
        let mut last: Option<Fork> = None;
        for current in self.forks() {
            if let Some(previous) = &last {
                match (previous.block, current.block) {
                    (None, Some(next_block)) => {
                        return Err(ForkOrderError::NotEnabled {
                            previous: previous.name,
                            next: current.name,
                            next_block,
                        });
                    }
                    (Some(previous_block), Some(next_block)) if previous_block > next_block => {
                        return Err(ForkOrderError::Misordered {
                            previous: previous.name,
                            previous_block,
                            next: current.name,
                            next_block,
                        });
                    }
                    _ => {}
                }
            }
            if !current.optional || current.block.is_some() {
                last = Some(current);
            }
        }

        for pair in self.priority_transactors_contracts.windows(2) {
            if pair[0].block >= pair[1].block {
                return Err(ForkOrderError::ContractTransition {
                    previous: pair[0].block,
                    next: pair[1].block,
                });
            }
        }
        Ok(())
    }

    /// Check whether `new` can replace `self` for a chain whose head is at
    /// `height`. The returned error carries the lowest rewind target among
    /// all conflicting forks.
    pub fn check_compatible(&self, new: &ChainConfig, height: u64) -> Option<ConfigCompatError> {
        let mut head = height;
        let mut last: Option<ConfigCompatError> = None;
        while let Some(err) = self.check_compatible_at(new, head) {
            if matches!(&last, Some(prev) if prev.rewind_to == err.rewind_to) {
                break;
            }
            head = err.rewind_to;
            last = Some(err);
        }
        last
    }

    fn check_compatible_at(&self, new: &ChainConfig, head: u64) -> Option<ConfigCompatError> {
        let pairs: [(&'static str, Option<u64>, Option<u64>); 5] = [
            ("Homestead fork block", self.homestead_block, new.homestead_block),
            ("EIP150 fork block", self.eip150_block, new.eip150_block),
            ("EIP155 fork block", self.eip155_block, new.eip155_block),
            ("EIP158 fork block", self.eip158_block, new.eip158_block),
            ("Byzantium fork block", self.byzantium_block, new.byzantium_block),
        ];
        for &(what, stored, candidate) in pairs.iter().take(4) {
            if is_fork_incompatible(stored, candidate, head) {
                return Some(compat_error(what, stored, candidate));
            }
        }
        if self.is_eip158(head) && self.chain_id != new.chain_id {
            return Some(compat_error("EIP158 chain ID", self.eip158_block, new.eip158_block));
        }
        let (what, stored, candidate) = pairs[4];
        if is_fork_incompatible(stored, candidate, head) {
            return Some(compat_error(what, stored, candidate));
        }
        if is_fork_incompatible(self.constantinople_block, new.constantinople_block, head) {
            return Some(compat_error(
                "Constantinople fork block",
                self.constantinople_block,
                new.constantinople_block,
            ));
        }
        // Petersburg may be moved into the past only onto Constantinople.
        if is_fork_incompatible(self.petersburg_block, new.petersburg_block, head)
            && is_fork_incompatible(self.constantinople_block, new.petersburg_block, head)
        {
            return Some(compat_error(
                "Petersburg fork block",
                self.petersburg_block,
                new.petersburg_block,
            ));
        }
        let rest: [(&'static str, Option<u64>, Option<u64>); 5] = [
            ("Istanbul fork block", self.istanbul_block, new.istanbul_block),
            ("Muir Glacier fork block", self.muir_glacier_block, new.muir_glacier_block),
            ("Berlin fork block", self.berlin_block, new.berlin_block),
            ("London fork block", self.london_block, new.london_block),
            ("Arrow Glacier fork block", self.arrow_glacier_block, new.arrow_glacier_block),
        ];
        rest.into_iter()
            .find(|(_, stored, candidate)| is_fork_incompatible(*stored, *candidate, head))
            .map(|(what, stored, candidate)| compat_error(what, stored, candidate))
    }

    // -------------------------------------------------------------------------
    // Presets
    // -------------------------------------------------------------------------

    fn all_forks_at_genesis(chain_id: u64) -> Self {
        Self {
            chain_id,
            homestead_block: Some(0),
            eip150_block: Some(0),
            eip155_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            petersburg_block: Some(0),
            istanbul_block: Some(0),
            muir_glacier_block: Some(0),
            berlin_block: Some(0),
            london_block: Some(0),
            arrow_glacier_block: Some(0),
            ..Default::default()
        }
    }

    /// Main network configuration.
    pub fn mainnet() -> Self {
        Self {
            ibft: Some(IbftConfig::default()),
            ..Self::all_forks_at_genesis(MAINNET_CHAIN_ID)
        }
    }

    /// Public test network configuration.
    pub fn testnet() -> Self {
        Self {
            ibft: Some(IbftConfig::default()),
            ..Self::all_forks_at_genesis(TESTNET_CHAIN_ID)
        }
    }

    /// Staging network configuration.
    pub fn stagenet() -> Self {
        Self {
            ibft: Some(IbftConfig {
                block_period_seconds: 1,
                ..IbftConfig::default()
            }),
            ..Self::all_forks_at_genesis(STAGENET_CHAIN_ID)
        }
    }

    /// Every protocol change active from genesis, proof-of-work sealing. Used
    /// as the permissive fallback when no configuration is known.
    pub fn all_ethash_protocol_changes() -> Self {
        Self::all_forks_at_genesis(DEVELOPER_CHAIN_ID)
    }

    /// Every protocol change active from genesis, signer-list sealing.
    pub fn all_clique_protocol_changes() -> Self {
        Self {
            clique: Some(CliqueConfig { period: 0, epoch: 30_000 }),
            ..Self::all_forks_at_genesis(DEVELOPER_CHAIN_ID)
        }
    }
}

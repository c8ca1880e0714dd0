//! # Network Registry
//!
//! Immutable table of well-known genesis hashes and the presets they were
//! built from. Hashes are computed once, when a network is registered.

use super::presets;
use super::spec::GenesisSpec;
use shared_types::{ChainConfig, H256};
use tracing::trace;

/// A network whose genesis is known ahead of time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    pub name: &'static str,
    pub hash: H256,
    pub spec: GenesisSpec,
}

impl Network {
    pub fn config(&self) -> ChainConfig {
        self.spec.config_or_default()
    }
}

/// Known networks, keyed by genesis hash. The first registered network is
/// the default genesis of an empty store.
#[derive(Clone, Debug, Default)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
}

impl NetworkRegistry {
    /// Registry with no known networks. Every stored genesis is treated as a
    /// private network.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mainnet (the default), testnet and stagenet.
    pub fn with_defaults() -> Self {
        Self::empty()
            .with_network("mainnet", presets::mainnet())
            .with_network("testnet", presets::testnet())
            .with_network("stagenet", presets::stagenet())
    }

    /// Register `spec` under `name`.
    pub fn with_network(mut self, name: &'static str, spec: GenesisSpec) -> Self {
        let hash = spec.hash();
        trace!(name, ?hash, "registered network");
        self.networks.push(Network { name, hash, spec });
        self
    }

    pub fn get(&self, hash: &H256) -> Option<&Network> {
        self.networks.iter().find(|network| network.hash == *hash)
    }

    pub fn by_name(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|network| network.name == name)
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.get(hash).is_some()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Genesis written to an empty store when none is supplied. Falls back
    /// to the mainnet preset when nothing is registered.
    pub fn default_spec(&self) -> GenesisSpec {
        self.networks
            .first()
            .map(|network| network.spec.clone())
            .unwrap_or_else(presets::mainnet)
    }

    /// Configuration of the network with genesis `hash`, if known.
    pub fn config_for(&self, hash: &H256) -> Option<ChainConfig> {
        self.get(hash).map(Network::config)
    }
}

//! # Network Presets
//!
//! Genesis specifications of the public networks and of the local developer
//! chain.

use super::builder::INITIAL_BASE_FEE;
use super::extra::{clique_extra_for_signers, genesis_extra_for_validators};
use super::spec::{GenesisAccount, GenesisAlloc, GenesisSpec};
use shared_types::{Address, ChainConfig, CliqueConfig, H256, U256};

/// Mix hash shared by the BFT network presets.
pub const BFT_MIX_HASH: H256 = H256([
    0x63, 0x74, 0x69, 0x63, 0x61, 0x6c, 0x20, 0x62, 0x79, 0x7a, 0x61, 0x6e, 0x74, 0x69, 0x6e, 0x65,
    0x20, 0x66, 0x61, 0x75, 0x6c, 0x74, 0x20, 0x74, 0x6f, 0x6c, 0x65, 0x72, 0x61, 0x6e, 0x63, 0x65,
]);

const MAINNET_VALIDATORS: [[u8; 20]; 9] = [
    hex20(b"135ec2bc4c04935ccd53967a072562120e4a3f92"),
    hex20(b"57752beb85f0b8811023f048039591ef9eb78929"),
    hex20(b"d8a2376cf7afa426414b960cfbfb4bb780e5181a"),
    hex20(b"83ff6272d1de08ad8d492167412f1f329bd805f3"),
    hex20(b"5584c91681cd7d850750941618dbaea2944e8ed4"),
    hex20(b"763976728bc214a5c389d3928e03661bd6e7a649"),
    hex20(b"915956a26fd7ee449d37ec93bbcfc5cad5ac8e27"),
    hex20(b"d3e10f17e2e34e0a0fea05573992b21e13c224c9"),
    hex20(b"7779ab2cb675d7a31714e86d01bd7a56a03f41d8"),
];

const TESTNET_VALIDATORS: [[u8; 20]; 4] = [
    hex20(b"3254e381fbc4b4cb796cadbaa7f8f1039ce672db"),
    hex20(b"ad76beb1f31c987ceb8bca6bb1889ea72651ce03"),
    hex20(b"3dec15db792252b5541b839b735731adc9e6506d"),
    hex20(b"3d950613caddabbe8e2188b61e0a4ab66754dddd"),
];

const STAGENET_VALIDATORS: [[u8; 20]; 5] = [
    hex20(b"c21ee98b5a90a6a45aba37fa5eddf90f5e8e1816"),
    hex20(b"ff0d56bd960c455a71f908496c79e8eafec34ccf"),
    hex20(b"07afbe0d7d36b80454be1e185f55e02b9453625a"),
    hex20(b"4f9a82d7e094de7fb70d9ce2033ec0d65ac31124"),
    hex20(b"97f060952b1008c75cb030e3599725ad5cc306a2"),
];

const MAINNET_TREASURY: [u8; 20] = hex20(b"7b56c6e6f53498e3e9332b180fe41f1add202f28");
const TESTNET_TREASURY: [u8; 20] = hex20(b"8baf588ed346f0dff956da926d0ab473b4bc9dd9");
const STAGENET_FAUCETS: [[u8; 20]; 2] = [
    hex20(b"72f1a0bAA7f1C79129A391C2F32bCD8247A18a63"),
    hex20(b"f29A0844926Fe8d63e5B211978B26E3f6d9e9fd5"),
];

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in preset address"),
    }
}

/// Compile-time address literal.
const fn hex20(text: &[u8; 40]) -> [u8; 20] {
    let mut out = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        out[i] = (nibble(text[2 * i]) << 4) | nibble(text[2 * i + 1]);
        i += 1;
    }
    out
}

fn addresses(raw: &[[u8; 20]]) -> Vec<Address> {
    raw.iter().copied().map(Address::from).collect()
}

fn single_alloc(address: [u8; 20], balance: U256) -> GenesisAlloc {
    [(Address::from(address), GenesisAccount::with_balance(balance))]
        .into_iter()
        .collect()
}

/// Main network genesis.
pub fn mainnet() -> GenesisSpec {
    GenesisSpec {
        config: Some(ChainConfig::mainnet()),
        extra_data: genesis_extra_for_validators(&addresses(&MAINNET_VALIDATORS)),
        gas_limit: 30_000_000,
        difficulty: Some(U256::one()),
        mix_hash: BFT_MIX_HASH,
        alloc: single_alloc(MAINNET_TREASURY, U256::exp10(27)),
        ..Default::default()
    }
}

/// Public test network genesis.
pub fn testnet() -> GenesisSpec {
    GenesisSpec {
        config: Some(ChainConfig::testnet()),
        timestamp: 1_704_292_320,
        extra_data: genesis_extra_for_validators(&addresses(&TESTNET_VALIDATORS)),
        gas_limit: 30_000_000,
        difficulty: Some(U256::one()),
        mix_hash: BFT_MIX_HASH,
        alloc: single_alloc(
            TESTNET_TREASURY,
            U256::from(1_795_180_856_576u64) * U256::exp10(16),
        ),
        ..Default::default()
    }
}

/// Staging network genesis.
pub fn stagenet() -> GenesisSpec {
    GenesisSpec {
        config: Some(ChainConfig::stagenet()),
        extra_data: genesis_extra_for_validators(&addresses(&STAGENET_VALIDATORS)),
        gas_limit: 16_234_336,
        difficulty: Some(U256::one()),
        mix_hash: BFT_MIX_HASH,
        alloc: STAGENET_FAUCETS
            .into_iter()
            .map(|raw| (Address::from(raw), GenesisAccount::with_balance(U256::exp10(27))))
            .collect(),
        ..Default::default()
    }
}

/// Single-signer development chain sealed by `faucet`, which also receives
/// almost the whole supply. Precompile addresses get one wei each.
pub fn developer(period: u64, gas_limit: u64, faucet: Address) -> GenesisSpec {
    let fallback = ChainConfig::all_clique_protocol_changes();
    let epoch = fallback.clique.as_ref().map_or(30_000, |clique| clique.epoch);
    let config = ChainConfig {
        clique: Some(CliqueConfig { period, epoch }),
        ..fallback
    };

    let mut alloc: GenesisAlloc = (1u64..=9)
        .map(|precompile| {
            (
                Address::from_low_u64_be(precompile),
                GenesisAccount::with_balance(U256::one()),
            )
        })
        .collect();
    alloc.insert(faucet, GenesisAccount::with_balance(U256::MAX - U256::from(8)));

    GenesisSpec {
        config: Some(config),
        extra_data: clique_extra_for_signers(&[faucet]),
        gas_limit,
        base_fee: Some(U256::from(INITIAL_BASE_FEE)),
        difficulty: Some(U256::one()),
        alloc,
        ..Default::default()
    }
}

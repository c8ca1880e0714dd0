//! # Bootstrap and Priority Path Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | Genesis | Hash of a preset (state root + header) | < 10ms |
//! | Genesis | Reconcile of an already initialised store | < 10ms |
//! | qc-10 | Recovery of both priority signers | < 1ms |
//! | qc-18 | `resolve_all` over a registry of N entries | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use node_runtime::genesis::{presets, GenesisReconciler, NetworkRegistry};
use qc_02_block_storage::{ChainStore, InMemoryKVStore};
use qc_04_state_management::StateDb;
use qc_10_signature_verification::TxSigner;
use qc_18_priority_transactors::PriorityTransactorRegistry;
use qc_tests::fixtures::{
    chain_config, genesis_with_registry, public_key, signed_priority_transfer, signing_key,
    RegistryContract, CHAIN_ID,
};
use shared_types::ConfigOverrides;
use std::time::Duration;

// ============================================================================
// GENESIS
// ============================================================================

fn bench_genesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("genesis");
    group.measurement_time(Duration::from_secs(10));

    for (name, spec) in [
        ("mainnet", presets::mainnet()),
        ("testnet", presets::testnet()),
        ("stagenet", presets::stagenet()),
    ] {
        group.bench_with_input(BenchmarkId::new("hash", name), &spec, |b, spec| {
            b.iter(|| black_box(spec.hash()))
        });
    }

    let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());
    let overrides = ConfigOverrides::default();
    let mut store = ChainStore::new(InMemoryKVStore::new());
    reconciler
        .setup_genesis_block(&mut store, None, &overrides)
        .expect("initial commit");

    group.bench_function("reconcile_initialised_store", |b| {
        b.iter(|| {
            black_box(
                reconciler
                    .setup_genesis_block(&mut store, None, &overrides)
                    .expect("restart"),
            )
        })
    });

    group.finish();
}

// ============================================================================
// PRIORITY TRANSACTIONS
// ============================================================================

fn bench_priority_signers(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-10-priority-signers");
    let signer = TxSigner::new(CHAIN_ID);
    let tx = signed_priority_transfer(&signing_key(1), &signing_key(2));

    group.bench_function("recover_priority_signers", |b| {
        b.iter(|| black_box(signer.recover_priority_signers(&tx).expect("valid signatures")))
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-priority-transactors");

    let config = chain_config(0);
    let mut store = ChainStore::new(InMemoryKVStore::new());
    let block = genesis_with_registry(config.clone(), &[])
        .commit(&mut store)
        .expect("genesis commit");
    let state = StateDb::open(block.header.root, &store).expect("genesis state");
    let registry = PriorityTransactorRegistry::new(&config);

    for size in [1u8, 10, 100] {
        let keys: Vec<_> = (1..=size).map(public_key).collect();
        let entries: Vec<_> = keys.iter().map(|key| (*key, size % 2 == 0, "entity")).collect();
        let evm = RegistryContract::new(&entries);

        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("resolve_all", size), &evm, |b, evm| {
            b.iter(|| black_box(registry.resolve_all(1, &state, evm).expect("registry call")))
        });
        group.bench_with_input(BenchmarkId::new("resolve_one", size), &evm, |b, evm| {
            b.iter(|| black_box(registry.resolve_one(1, &keys[0], &state, evm)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_genesis, bench_priority_signers, bench_registry);
criterion_main!(benches);

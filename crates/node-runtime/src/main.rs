//! # Node Runtime
//!
//! Entry point of the node.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Read `NodeConfig` from the environment
//! 3. Lock the data directory
//! 4. Open the store and parse the genesis file, if any
//! 5. Reconcile the stored chain with the genesis
//! 6. Run until Ctrl+C

use std::path::Path;

use anyhow::{Context, Result};
use qc_02_block_storage::{ChainStore, KeyValueStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use node_runtime::adapters::storage::InMemoryKVStore;
use node_runtime::adapters::DataDirLock;
use node_runtime::container::GenesisConfig;
use node_runtime::genesis::{GenesisReconciler, GenesisSpec, NetworkRegistry};
use node_runtime::{NodeConfig, NodeRuntime, StorageBackend};

fn load_genesis(path: &Path) -> Result<GenesisSpec> {
    let raw = std::fs::read(path)
        .with_context(|| format!("failed to read genesis file {}", path.display()))?;
    GenesisSpec::from_json(&raw)
        .with_context(|| format!("invalid genesis file {}", path.display()))
}

async fn run<S: KeyValueStore>(store: ChainStore<S>, genesis: &GenesisConfig) -> Result<()> {
    let spec = genesis.file.as_deref().map(load_genesis).transpose()?;
    let reconciler = GenesisReconciler::new(NetworkRegistry::with_defaults());

    let node = NodeRuntime::bootstrap(store, &reconciler, spec.as_ref(), &genesis.overrides)
        .context("failed to set up genesis block")?;
    if let Some(rewind) = node.pending_rewind() {
        warn!(%rewind, "new chain config not applied");
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    node.shutdown();
    Ok(())
}

#[cfg(feature = "rocksdb")]
async fn run_rocksdb(config: &NodeConfig) -> Result<()> {
    use node_runtime::adapters::storage::{RocksDbConfig, RocksDbStore};

    let path = config.storage.chaindata_path();
    let store = RocksDbStore::open(&RocksDbConfig::new(&path))
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    run(ChainStore::new(store), &config.genesis).await
}

#[cfg(not(feature = "rocksdb"))]
async fn run_rocksdb(_config: &NodeConfig) -> Result<()> {
    anyhow::bail!("rocksdb backend requested but node-runtime was built without the `rocksdb` feature")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = NodeConfig::from_env().context("invalid node configuration")?;
    info!(
        data_dir = %config.storage.data_dir.display(),
        backend = ?config.storage.backend,
        "starting node"
    );

    let _lock = DataDirLock::acquire(&config.storage.lock_path())
        .context("failed to lock data directory")?;

    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("using in-memory store, chain data is lost on exit");
            run(ChainStore::new(InMemoryKVStore::new()), &config.genesis).await
        }
        StorageBackend::RocksDb => run_rocksdb(&config).await,
    }
}

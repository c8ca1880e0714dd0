//! # Genesis Builder
//!
//! Turns a `GenesisSpec` into block zero and commits it.
//!
//! ## Header Defaults
//!
//! | Field | Rule |
//! |-------|------|
//! | gas limit | `GENESIS_GAS_LIMIT` when zero |
//! | difficulty | `GENESIS_DIFFICULTY` when unset and the mix hash is zero |
//! | base fee | spec value or `INITIAL_BASE_FEE` when London is active at 0, otherwise none |
//!
//! ## Commit
//!
//! Validation runs first. Every record is then staged in one `WriteBatch`:
//! state trie, allocation blob, total difficulty, block, empty receipts,
//! canonical hash, head pointers and the chain configuration.

use super::errors::GenesisError;
use super::extra::{EXTRA_SEAL, EXTRA_VANITY};
use super::registry::NetworkRegistry;
use super::spec::{GenesisAccount, GenesisAlloc, GenesisSpec};
use qc_02_block_storage::{ChainStore, KeyValueStore};
use qc_04_state_management::TrieDatabase;
use shared_types::{encode_nonce, Address, Block, Header, H256, U256};
use tracing::{debug, info};

/// Gas limit of a genesis that does not set one.
pub const GENESIS_GAS_LIMIT: u64 = 4_712_388;

/// Difficulty of a genesis that sets neither difficulty nor mix hash.
pub const GENESIS_DIFFICULTY: u64 = 131_072;

/// Base fee of a London genesis that does not set one.
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

impl GenesisSpec {
    fn header(&self, root: H256) -> Header {
        let mut header = Header {
            number: self.number,
            nonce: encode_nonce(self.nonce),
            time: self.timestamp,
            parent_hash: self.parent_hash,
            extra: self.extra_data.clone(),
            gas_limit: self.gas_limit,
            gas_used: self.gas_used,
            base_fee: None,
            difficulty: self.difficulty.unwrap_or_default(),
            mix_digest: self.mix_hash,
            coinbase: self.coinbase,
            root,
            ..Default::default()
        };
        if self.gas_limit == 0 {
            header.gas_limit = GENESIS_GAS_LIMIT;
        }
        if self.difficulty.is_none() && self.mix_hash.is_zero() {
            header.difficulty = U256::from(GENESIS_DIFFICULTY);
        }
        if self.config.as_ref().is_some_and(|config| config.is_london(0)) {
            header.base_fee = Some(self.base_fee.unwrap_or_else(|| U256::from(INITIAL_BASE_FEE)));
        }
        header
    }

    /// Build the genesis block without writing anything.
    pub fn to_block(&self) -> Block {
        let root = self.alloc.to_state().intermediate_root();
        Block::with_empty_body(self.header(root))
    }

    /// Hash the genesis block would have once committed.
    pub fn hash(&self) -> H256 {
        self.to_block().hash()
    }

    /// Flush the allocation into `db` and build the genesis block on top of
    /// the resulting state root.
    pub fn materialize<D: TrieDatabase + ?Sized>(&self, db: &mut D) -> Result<Block, GenesisError> {
        let root = self.alloc.flush(db)?;
        Ok(Block::with_empty_body(self.header(root)))
    }

    /// Write the genesis block, its state and its configuration as the
    /// canonical head of `store`.
    pub fn commit<S: KeyValueStore>(&self, store: &mut ChainStore<S>) -> Result<Block, GenesisError> {
        let mut batch = store.batch();
        let block = self.materialize(&mut batch)?;
        if block.number() != 0 {
            return Err(GenesisError::InvalidGenesisHeight(block.number()));
        }
        let config = self.config_or_default();
        config.check_config_fork_order()?;
        if config.clique.is_some() && block.header.extra.len() < EXTRA_VANITY + EXTRA_SEAL {
            return Err(GenesisError::MissingSignerSet);
        }

        let hash = block.hash();
        batch.write_genesis_state(hash, serde_json::to_vec(&self.alloc)?);
        batch.write_td(hash, 0, block.header.difficulty);
        batch.write_block(&block);
        batch.write_raw_receipts(hash, 0, rlp::EMPTY_LIST_RLP.to_vec());
        batch.write_canonical_hash(hash, 0);
        batch.write_head_block_hash(hash);
        batch.write_head_fast_block_hash(hash);
        batch.write_head_header_hash(hash);
        batch.write_chain_config(hash, &config)?;
        store.write(batch)?;

        info!(
            ?hash,
            chain_id = config.chain_id,
            accounts = self.alloc.len(),
            state_root = ?block.header.root,
            "committed genesis block"
        );
        Ok(block)
    }
}

/// Re-flush the allocation of the genesis `hash` into `store`.
///
/// The persisted allocation blob is preferred; a known network falls back to
/// its preset allocation. Anything else is `StateNotFound`.
pub fn commit_genesis_state<S: KeyValueStore>(
    store: &mut ChainStore<S>,
    hash: H256,
    networks: &NetworkRegistry,
) -> Result<H256, GenesisError> {
    let alloc: GenesisAlloc = match store.read_genesis_state(&hash)? {
        Some(blob) => serde_json::from_slice(&blob)?,
        None => networks
            .get(&hash)
            .map(|network| network.spec.alloc.clone())
            .ok_or(GenesisError::StateNotFound(hash))?,
    };
    let mut batch = store.batch();
    let root = alloc.flush(&mut batch)?;
    store.write(batch)?;
    debug!(?hash, ?root, accounts = alloc.len(), "re-committed genesis state");
    Ok(root)
}

/// Genesis at the fallback configuration funding `address` with `balance`.
pub fn genesis_for_testing(address: Address, balance: U256) -> GenesisSpec {
    let mut alloc = GenesisAlloc::new();
    alloc.insert(address, GenesisAccount::with_balance(balance));
    GenesisSpec {
        alloc,
        base_fee: Some(U256::from(INITIAL_BASE_FEE)),
        ..Default::default()
    }
}

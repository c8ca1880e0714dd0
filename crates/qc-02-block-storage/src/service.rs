//! # Chain Store
//!
//! Typed access to the chain database. Reads go straight to the store;
//! writes are staged in a `WriteBatch` and applied atomically so that a
//! failed multi-record write leaves nothing behind.

use crate::domain::errors::StorageError;
use crate::domain::keys::{self, HEAD_BLOCK_KEY, HEAD_FAST_BLOCK_KEY, HEAD_HEADER_KEY};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use qc_04_state_management::{StateError, TrieDatabase};
use shared_types::{Block, BlockBody, ChainConfig, Header, H256, U256};
use tracing::{debug, trace};

/// Staged writes for one atomic commit.
///
/// Also usable as a write-only `TrieDatabase`: node and code reads only see
/// what was staged in this batch.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.operations
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.operations.push(BatchOperation::put(key, value));
    }

    fn staged(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.operations.iter().rev().find(|op| op.key() == key).and_then(|op| match op {
            BatchOperation::Put { value, .. } => Some(value.clone()),
            BatchOperation::Delete { .. } => None,
        })
    }

    /// Stage the header and its hash -> number mapping.
    pub fn write_header(&mut self, header: &Header) {
        let hash = header.hash();
        self.put(
            keys::header_number_key(&hash),
            header.number.to_be_bytes().to_vec(),
        );
        self.put(
            keys::header_key(header.number, &hash),
            rlp::encode(header).to_vec(),
        );
    }

    pub fn write_body(&mut self, hash: H256, number: u64, body: &BlockBody) {
        self.put(keys::body_key(number, &hash), rlp::encode(body).to_vec());
    }

    /// Stage header and body.
    pub fn write_block(&mut self, block: &Block) {
        self.write_body(block.hash(), block.number(), &block.body);
        self.write_header(&block.header);
    }

    pub fn write_td(&mut self, hash: H256, number: u64, td: U256) {
        self.put(keys::td_key(number, &hash), rlp::encode(&td).to_vec());
    }

    /// Stage an already RLP-encoded receipt list.
    pub fn write_raw_receipts(&mut self, hash: H256, number: u64, encoded: Vec<u8>) {
        self.put(keys::receipts_key(number, &hash), encoded);
    }

    pub fn write_canonical_hash(&mut self, hash: H256, number: u64) {
        self.put(keys::canonical_key(number), hash.as_bytes().to_vec());
    }

    pub fn write_head_header_hash(&mut self, hash: H256) {
        self.put(HEAD_HEADER_KEY.to_vec(), hash.as_bytes().to_vec());
    }

    pub fn write_head_block_hash(&mut self, hash: H256) {
        self.put(HEAD_BLOCK_KEY.to_vec(), hash.as_bytes().to_vec());
    }

    pub fn write_head_fast_block_hash(&mut self, hash: H256) {
        self.put(HEAD_FAST_BLOCK_KEY.to_vec(), hash.as_bytes().to_vec());
    }

    /// Stage the chain configuration as JSON under the genesis hash.
    pub fn write_chain_config(
        &mut self,
        genesis_hash: H256,
        config: &ChainConfig,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec(config)?;
        self.put(keys::config_key(&genesis_hash), encoded);
        Ok(())
    }

    /// Stage the serialized genesis allocation under the genesis hash.
    pub fn write_genesis_state(&mut self, genesis_hash: H256, blob: Vec<u8>) {
        self.put(keys::genesis_state_key(&genesis_hash), blob);
    }
}

impl TrieDatabase for WriteBatch {
    fn get_node(&self, hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.staged(&keys::trie_node_key(hash)))
    }

    fn put_node(&mut self, hash: H256, data: Vec<u8>) -> Result<(), StateError> {
        self.put(keys::trie_node_key(&hash), data);
        Ok(())
    }

    fn delete_node(&mut self, hash: &H256) -> Result<(), StateError> {
        self.operations
            .push(BatchOperation::delete(keys::trie_node_key(hash)));
        Ok(())
    }

    fn get_code(&self, code_hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.staged(&keys::code_key(code_hash)))
    }

    fn put_code(&mut self, code_hash: H256, code: Vec<u8>) -> Result<(), StateError> {
        self.put(keys::code_key(&code_hash), code);
        Ok(())
    }
}

/// Chain database over any `KeyValueStore`.
#[derive(Debug, Default, Clone)]
pub struct ChainStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ChainStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Start an empty batch.
    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new()
    }

    /// Apply a batch atomically.
    pub fn write(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        trace!(operations = batch.len(), "applying write batch");
        self.store.atomic_batch_write(batch.into_operations())?;
        Ok(())
    }

    fn read_hash(&self, key: &[u8], what: &'static str) -> Result<Option<H256>, StorageError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(raw) if raw.len() == 32 => Ok(Some(H256::from_slice(&raw))),
            Some(raw) => Err(StorageError::CorruptedRecord {
                what,
                reason: format!("expected 32 bytes, got {}", raw.len()),
            }),
        }
    }

    pub fn read_canonical_hash(&self, number: u64) -> Result<Option<H256>, StorageError> {
        self.read_hash(&keys::canonical_key(number), "canonical hash")
    }

    pub fn read_header_number(&self, hash: &H256) -> Result<Option<u64>, StorageError> {
        match self.store.get(&keys::header_number_key(hash))? {
            None => Ok(None),
            Some(raw) => {
                let bytes: [u8; 8] =
                    raw.as_slice()
                        .try_into()
                        .map_err(|_| StorageError::CorruptedRecord {
                            what: "header number",
                            reason: format!("expected 8 bytes, got {}", raw.len()),
                        })?;
                Ok(Some(u64::from_be_bytes(bytes)))
            }
        }
    }

    pub fn read_header(&self, hash: &H256, number: u64) -> Result<Option<Header>, StorageError> {
        match self.store.get(&keys::header_key(number, hash))? {
            None => Ok(None),
            Some(raw) => Ok(Some(rlp::decode(&raw)?)),
        }
    }

    /// Look up the number first, then the header.
    pub fn read_header_by_hash(&self, hash: &H256) -> Result<Option<Header>, StorageError> {
        match self.read_header_number(hash)? {
            None => Ok(None),
            Some(number) => self.read_header(hash, number),
        }
    }

    pub fn read_body(&self, hash: &H256, number: u64) -> Result<Option<BlockBody>, StorageError> {
        match self.store.get(&keys::body_key(number, hash))? {
            None => Ok(None),
            Some(raw) => Ok(Some(rlp::decode(&raw)?)),
        }
    }

    pub fn read_block(&self, hash: &H256, number: u64) -> Result<Option<Block>, StorageError> {
        let Some(header) = self.read_header(hash, number)? else {
            return Ok(None);
        };
        let Some(body) = self.read_body(hash, number)? else {
            return Ok(None);
        };
        Ok(Some(Block { header, body }))
    }

    pub fn read_td(&self, hash: &H256, number: u64) -> Result<Option<U256>, StorageError> {
        match self.store.get(&keys::td_key(number, hash))? {
            None => Ok(None),
            Some(raw) => Ok(Some(rlp::decode(&raw)?)),
        }
    }

    pub fn read_raw_receipts(
        &self,
        hash: &H256,
        number: u64,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.store.get(&keys::receipts_key(number, hash))?)
    }

    pub fn read_head_header_hash(&self) -> Result<Option<H256>, StorageError> {
        self.read_hash(HEAD_HEADER_KEY, "head header")
    }

    pub fn read_head_block_hash(&self) -> Result<Option<H256>, StorageError> {
        self.read_hash(HEAD_BLOCK_KEY, "head block")
    }

    pub fn read_head_fast_block_hash(&self) -> Result<Option<H256>, StorageError> {
        self.read_hash(HEAD_FAST_BLOCK_KEY, "head fast block")
    }

    /// Stored chain configuration for the chain with this genesis.
    pub fn read_chain_config(
        &self,
        genesis_hash: &H256,
    ) -> Result<Option<ChainConfig>, StorageError> {
        match self.store.get(&keys::config_key(genesis_hash))? {
            None => Ok(None),
            Some(raw) => {
                let config = serde_json::from_slice(&raw)?;
                Ok(Some(config))
            }
        }
    }

    /// Write the chain configuration on its own.
    pub fn write_chain_config(
        &mut self,
        genesis_hash: H256,
        config: &ChainConfig,
    ) -> Result<(), StorageError> {
        let mut batch = self.batch();
        batch.write_chain_config(genesis_hash, config)?;
        debug!(?genesis_hash, chain_id = config.chain_id, "stored chain config");
        self.write(batch)
    }

    pub fn read_genesis_state(&self, genesis_hash: &H256) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.store.get(&keys::genesis_state_key(genesis_hash))?)
    }
}

impl<S: KeyValueStore> TrieDatabase for ChainStore<S> {
    fn get_node(&self, hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.store.get(&keys::trie_node_key(hash))?)
    }

    fn put_node(&mut self, hash: H256, data: Vec<u8>) -> Result<(), StateError> {
        Ok(self.store.put(&keys::trie_node_key(&hash), &data)?)
    }

    fn delete_node(&mut self, hash: &H256) -> Result<(), StateError> {
        Ok(self.store.delete(&keys::trie_node_key(hash))?)
    }

    fn batch_put(&mut self, nodes: Vec<(H256, Vec<u8>)>) -> Result<(), StateError> {
        let operations = nodes
            .into_iter()
            .map(|(hash, data)| BatchOperation::put(keys::trie_node_key(&hash), data))
            .collect();
        Ok(self.store.atomic_batch_write(operations)?)
    }

    fn get_code(&self, code_hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.store.get(&keys::code_key(code_hash))?)
    }

    fn put_code(&mut self, code_hash: H256, code: Vec<u8>) -> Result<(), StateError> {
        Ok(self.store.put(&keys::code_key(&code_hash), &code)?)
    }
}

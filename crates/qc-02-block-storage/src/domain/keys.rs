//! # Key Schema
//!
//! Every record type lives under its own prefix. Block-scoped records embed
//! the big-endian block number before the hash so that one height's records
//! sort together.

use shared_types::H256;

/// Key prefixes for the different record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `h{num}{hash}` -> header, `h{num}{hash}t` -> total difficulty,
    /// `h{num}n` -> canonical hash.
    Header,
    /// `H{hash}` -> block number.
    HeaderNumber,
    /// `b{num}{hash}` -> body.
    Body,
    /// `r{num}{hash}` -> receipts.
    Receipts,
    /// `c{code_hash}` -> contract code.
    Code,
    /// `ethereum-config-{hash}` -> chain configuration JSON.
    Config,
    /// `ethereum-genesis-{hash}` -> genesis allocation JSON.
    GenesisState,
    /// Trie nodes are stored under their bare hash.
    TrieNode,
}

const TD_SUFFIX: &[u8] = b"t";
const CANONICAL_SUFFIX: &[u8] = b"n";

pub const HEAD_HEADER_KEY: &[u8] = b"LastHeader";
pub const HEAD_BLOCK_KEY: &[u8] = b"LastBlock";
pub const HEAD_FAST_BLOCK_KEY: &[u8] = b"LastFast";

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Header => b"h",
            KeyPrefix::HeaderNumber => b"H",
            KeyPrefix::Body => b"b",
            KeyPrefix::Receipts => b"r",
            KeyPrefix::Code => b"c",
            KeyPrefix::Config => b"ethereum-config-",
            KeyPrefix::GenesisState => b"ethereum-genesis-",
            KeyPrefix::TrieNode => b"",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// `prefix ++ num ++ hash`
    pub fn block_key(&self, number: u64, hash: &H256) -> Vec<u8> {
        let mut key = self.key(&number.to_be_bytes());
        key.extend_from_slice(hash.as_bytes());
        key
    }
}

pub fn header_key(number: u64, hash: &H256) -> Vec<u8> {
    KeyPrefix::Header.block_key(number, hash)
}

pub fn td_key(number: u64, hash: &H256) -> Vec<u8> {
    let mut key = header_key(number, hash);
    key.extend_from_slice(TD_SUFFIX);
    key
}

pub fn canonical_key(number: u64) -> Vec<u8> {
    let mut key = KeyPrefix::Header.key(&number.to_be_bytes());
    key.extend_from_slice(CANONICAL_SUFFIX);
    key
}

pub fn header_number_key(hash: &H256) -> Vec<u8> {
    KeyPrefix::HeaderNumber.key(hash.as_bytes())
}

pub fn body_key(number: u64, hash: &H256) -> Vec<u8> {
    KeyPrefix::Body.block_key(number, hash)
}

pub fn receipts_key(number: u64, hash: &H256) -> Vec<u8> {
    KeyPrefix::Receipts.block_key(number, hash)
}

pub fn code_key(code_hash: &H256) -> Vec<u8> {
    KeyPrefix::Code.key(code_hash.as_bytes())
}

pub fn config_key(hash: &H256) -> Vec<u8> {
    KeyPrefix::Config.key(hash.as_bytes())
}

pub fn genesis_state_key(hash: &H256) -> Vec<u8> {
    KeyPrefix::GenesisState.key(hash.as_bytes())
}

pub fn trie_node_key(hash: &H256) -> Vec<u8> {
    KeyPrefix::TrieNode.key(hash.as_bytes())
}

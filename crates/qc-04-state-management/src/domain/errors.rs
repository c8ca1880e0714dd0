use shared_types::H256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    /// A node referenced from a committed trie is not in the database.
    #[error("missing trie node {0:?}")]
    MissingTrieNode(H256),

    #[error("missing contract code {0:?}")]
    MissingCode(H256),

    #[error("invalid trie node: {0}")]
    InvalidTrieNode(String),

    #[error("rlp decoding failed: {0}")]
    Rlp(#[from] rlp::DecoderError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

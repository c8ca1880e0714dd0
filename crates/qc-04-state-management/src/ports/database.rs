use crate::domain::StateError;
use shared_types::H256;

/// Trie database abstraction.
///
/// Nodes are addressed by the Keccak256 of their RLP encoding, contract code
/// by its code hash. Writes must be visible to subsequent reads through the
/// same handle.
pub trait TrieDatabase: Send + Sync {
    fn get_node(&self, hash: &H256) -> Result<Option<Vec<u8>>, StateError>;
    fn put_node(&mut self, hash: H256, data: Vec<u8>) -> Result<(), StateError>;
    fn delete_node(&mut self, hash: &H256) -> Result<(), StateError>;

    fn batch_put(&mut self, nodes: Vec<(H256, Vec<u8>)>) -> Result<(), StateError> {
        for (hash, data) in nodes {
            self.put_node(hash, data)?;
        }
        Ok(())
    }

    fn get_code(&self, code_hash: &H256) -> Result<Option<Vec<u8>>, StateError>;
    fn put_code(&mut self, code_hash: H256, code: Vec<u8>) -> Result<(), StateError>;
}

use crate::domain::StateError;
use crate::ports::TrieDatabase;
use shared_types::H256;
use std::collections::HashMap;

/// In-memory implementation of TrieDatabase.
///
/// Used for tests and as a staging area: a state can be committed here,
/// inspected, and only then flushed into a persistent database.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTrieDb {
    nodes: HashMap<H256, Vec<u8>>,
    codes: HashMap<H256, Vec<u8>>,
}

impl InMemoryTrieDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_hashes(&self) -> Vec<H256> {
        self.nodes.keys().copied().collect()
    }

    /// Move every node and code blob into `target`.
    pub fn flush_into<D: TrieDatabase + ?Sized>(self, target: &mut D) -> Result<(), StateError> {
        target.batch_put(self.nodes.into_iter().collect())?;
        for (hash, code) in self.codes {
            target.put_code(hash, code)?;
        }
        Ok(())
    }
}

impl TrieDatabase for InMemoryTrieDb {
    fn get_node(&self, hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.nodes.get(hash).cloned())
    }

    fn put_node(&mut self, hash: H256, data: Vec<u8>) -> Result<(), StateError> {
        self.nodes.insert(hash, data);
        Ok(())
    }

    fn delete_node(&mut self, hash: &H256) -> Result<(), StateError> {
        self.nodes.remove(hash);
        Ok(())
    }

    fn batch_put(&mut self, batch: Vec<(H256, Vec<u8>)>) -> Result<(), StateError> {
        self.nodes.extend(batch);
        Ok(())
    }

    fn get_code(&self, code_hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.codes.get(code_hash).cloned())
    }

    fn put_code(&mut self, code_hash: H256, code: Vec<u8>) -> Result<(), StateError> {
        self.codes.insert(code_hash, code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trie_db_operations() {
        let mut db = InMemoryTrieDb::new();
        let hash = H256::repeat_byte(0xAB);
        let data = vec![1, 2, 3, 4];

        // Put
        db.put_node(hash, data.clone()).unwrap();

        // Get
        let retrieved = db.get_node(&hash).unwrap();
        assert_eq!(retrieved, Some(data));

        // Delete
        db.delete_node(&hash).unwrap();
        let retrieved = db.get_node(&hash).unwrap();
        assert_eq!(retrieved, None);
    }

    #[test]
    fn test_flush_into_moves_nodes_and_code() {
        let mut staging = InMemoryTrieDb::new();
        staging.put_node(H256::repeat_byte(1), vec![0xc0]).unwrap();
        staging.put_code(H256::repeat_byte(2), vec![0x60, 0x00]).unwrap();

        let mut target = InMemoryTrieDb::new();
        staging.flush_into(&mut target).unwrap();

        assert_eq!(target.node_count(), 1);
        assert_eq!(
            target.get_code(&H256::repeat_byte(2)).unwrap(),
            Some(vec![0x60, 0x00])
        );
    }
}

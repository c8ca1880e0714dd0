//! # Patricia Merkle Trie
//!
//! Entries are kept in key order and the node structure is derived from the
//! sorted set on demand, so the root is a pure function of the content.

use super::errors::StateError;
use super::nibbles::Nibbles;
use super::node::{NodeRef, TrieNode};
use crate::ports::TrieDatabase;
use shared_types::{keccak256, H256, EMPTY_ROOT_HASH};
use std::collections::BTreeMap;

/// Canonical Merkle Patricia Trie over byte keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatriciaMerkleTrie {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl PatriciaMerkleTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An empty value deletes the key.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        if value.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_vec(), value);
        }
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Root hash without persisting anything.
    pub fn root_hash(&self) -> H256 {
        self.encode().0
    }

    /// Write every hashed node to `db` and return the root.
    ///
    /// The root node is always stored by hash, even when its encoding is
    /// shorter than 32 bytes. The empty trie writes nothing.
    pub fn commit<D: TrieDatabase + ?Sized>(&self, db: &mut D) -> Result<H256, StateError> {
        let (root, nodes) = self.encode();
        if !nodes.is_empty() {
            db.batch_put(nodes)?;
        }
        Ok(root)
    }

    /// Load the full content of the trie rooted at `root`.
    ///
    /// Fails with `MissingTrieNode` if any reachable node is absent.
    pub fn load<D: TrieDatabase + ?Sized>(root: H256, db: &D) -> Result<Self, StateError> {
        let mut trie = Self::new();
        if root == EMPTY_ROOT_HASH {
            return Ok(trie);
        }
        let encoded = db
            .get_node(&root)?
            .ok_or(StateError::MissingTrieNode(root))?;
        trie.collect(&encoded, Nibbles::default(), db)?;
        Ok(trie)
    }

    fn encode(&self) -> (H256, Vec<(H256, Vec<u8>)>) {
        if self.entries.is_empty() {
            return (EMPTY_ROOT_HASH, Vec::new());
        }
        let keyed: Vec<(Nibbles, &[u8])> = self
            .entries
            .iter()
            .map(|(k, v)| (Nibbles::from_bytes(k), v.as_slice()))
            .collect();

        let mut nodes = Vec::new();
        let encoded = build(&keyed, 0, &mut nodes).rlp_encode();
        let root = keccak256(&encoded);
        nodes.push((root, encoded));
        (root, nodes)
    }

    fn collect<D: TrieDatabase + ?Sized>(
        &mut self,
        encoded: &[u8],
        prefix: Nibbles,
        db: &D,
    ) -> Result<(), StateError> {
        match TrieNode::decode(encoded)? {
            TrieNode::Leaf { path, value } => self.collect_value(&prefix.join(&path), value),
            TrieNode::Extension { path, child } => self.collect_ref(&child, prefix.join(&path), db),
            TrieNode::Branch { children, value } => {
                if let Some(value) = value {
                    self.collect_value(&prefix, value)?;
                }
                for (nibble, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        let mut path = prefix.clone();
                        path.push(nibble as u8);
                        self.collect_ref(child, path, db)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn collect_ref<D: TrieDatabase + ?Sized>(
        &mut self,
        child: &NodeRef,
        prefix: Nibbles,
        db: &D,
    ) -> Result<(), StateError> {
        match child {
            NodeRef::Inline(raw) => self.collect(raw, prefix, db),
            NodeRef::Hash(hash) => {
                let encoded = db
                    .get_node(hash)?
                    .ok_or(StateError::MissingTrieNode(*hash))?;
                self.collect(&encoded, prefix, db)
            }
        }
    }

    fn collect_value(&mut self, path: &Nibbles, value: Vec<u8>) -> Result<(), StateError> {
        let key = path
            .to_bytes()
            .ok_or_else(|| StateError::InvalidTrieNode("value at odd nibble depth".into()))?;
        self.entries.insert(key, value);
        Ok(())
    }
}

/// Build the node covering `entries` (sorted, non-empty, sharing the first
/// `depth` nibbles).
fn build(entries: &[(Nibbles, &[u8])], depth: usize, sink: &mut Vec<(H256, Vec<u8>)>) -> TrieNode {
    if let [(key, value)] = entries {
        return TrieNode::Leaf {
            path: key.slice(depth),
            value: value.to_vec(),
        };
    }

    // Sorted input: the prefix shared by all keys is the one shared by the
    // first and the last.
    let first = &entries[0].0;
    let last = &entries[entries.len() - 1].0;
    let shared = first.slice(depth).common_prefix_len(&last.slice(depth));
    if shared > 0 {
        let child = build(entries, depth + shared, sink);
        return TrieNode::Extension {
            path: first.slice_range(depth, depth + shared),
            child: NodeRef::to_node(&child, sink),
        };
    }

    let mut rest = entries;
    let mut value = None;
    if rest[0].0.len() == depth {
        value = Some(rest[0].1.to_vec());
        rest = &rest[1..];
    }

    let mut children: [Option<NodeRef>; 16] = Default::default();
    for (nibble, slot) in children.iter_mut().enumerate() {
        let end = rest
            .iter()
            .take_while(|(key, _)| key.at(depth) as usize == nibble)
            .count();
        if end > 0 {
            let child = build(&rest[..end], depth + 1, sink);
            *slot = Some(NodeRef::to_node(&child, sink));
            rest = &rest[end..];
        }
    }

    TrieNode::Branch {
        children: Box::new(children),
        value,
    }
}

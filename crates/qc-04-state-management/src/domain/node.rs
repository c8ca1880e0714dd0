use super::{errors::StateError, nibbles::Nibbles};
use rlp::{Rlp, RlpStream};
use shared_types::{keccak256, H256};

// =============================================================================
// TRIE NODE: The node types in MPT
// =============================================================================

/// Reference from a parent node to a child.
///
/// Children whose encoding is shorter than 32 bytes are embedded in the
/// parent; all others are referenced by the Keccak256 of their encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    Hash(H256),
    /// Raw RLP of the embedded child.
    Inline(Vec<u8>),
}

impl NodeRef {
    /// Reference `node`, collecting its encoding into `sink` when it is
    /// stored by hash.
    pub fn to_node(node: &TrieNode, sink: &mut Vec<(H256, Vec<u8>)>) -> Self {
        let encoded = node.rlp_encode();
        if encoded.len() < 32 {
            NodeRef::Inline(encoded)
        } else {
            let hash = keccak256(&encoded);
            sink.push((hash, encoded));
            NodeRef::Hash(hash)
        }
    }

    fn append(&self, s: &mut RlpStream) {
        match self {
            NodeRef::Hash(hash) => {
                s.append(hash);
            }
            NodeRef::Inline(raw) => {
                s.append_raw(raw, 1);
            }
        }
    }

    fn decode(item: &Rlp) -> Result<Option<Self>, StateError> {
        if item.is_list() {
            return Ok(Some(NodeRef::Inline(item.as_raw().to_vec())));
        }
        let data = item.data()?;
        match data.len() {
            0 => Ok(None),
            32 => Ok(Some(NodeRef::Hash(H256::from_slice(data)))),
            len => Err(StateError::InvalidTrieNode(format!(
                "child reference of {len} bytes"
            ))),
        }
    }
}

/// Node types in the Patricia Merkle Trie.
///
/// Per Ethereum Yellow Paper Appendix D (the empty trie has no node and is
/// represented by `EMPTY_ROOT_HASH`):
/// - Leaf (remaining path + value)
/// - Extension (shared prefix + single child)
/// - Branch (16 children + optional value)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    /// RLP: [hex_prefix_encode(path, true), value]
    Leaf { path: Nibbles, value: Vec<u8> },

    /// RLP: [hex_prefix_encode(path, false), child]
    Extension { path: Nibbles, child: NodeRef },

    /// RLP: \[child\[0\], ..., child\[15\], value\]
    Branch {
        children: Box<[Option<NodeRef>; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    /// RLP-encode this node.
    pub fn rlp_encode(&self) -> Vec<u8> {
        match self {
            TrieNode::Leaf { path, value } => {
                let mut s = RlpStream::new_list(2);
                s.append(&path.encode_hex_prefix(true));
                s.append(value);
                s.out().to_vec()
            }

            TrieNode::Extension { path, child } => {
                let mut s = RlpStream::new_list(2);
                s.append(&path.encode_hex_prefix(false));
                child.append(&mut s);
                s.out().to_vec()
            }

            TrieNode::Branch { children, value } => {
                let mut s = RlpStream::new_list(17);
                for child in children.iter() {
                    match child {
                        Some(child) => child.append(&mut s),
                        None => {
                            s.append_empty_data();
                        }
                    }
                }
                match value {
                    Some(value) => {
                        s.append(value);
                    }
                    None => {
                        s.append_empty_data();
                    }
                }
                s.out().to_vec()
            }
        }
    }

    /// Decode a node from its RLP encoding.
    pub fn decode(encoded: &[u8]) -> Result<Self, StateError> {
        let rlp = Rlp::new(encoded);
        match rlp.item_count()? {
            2 => {
                let (path, is_leaf) = Nibbles::decode_hex_prefix(rlp.at(0)?.data()?);
                if is_leaf {
                    Ok(TrieNode::Leaf {
                        path,
                        value: rlp.at(1)?.data()?.to_vec(),
                    })
                } else {
                    let child = NodeRef::decode(&rlp.at(1)?)?.ok_or_else(|| {
                        StateError::InvalidTrieNode("extension without child".into())
                    })?;
                    Ok(TrieNode::Extension { path, child })
                }
            }
            17 => {
                let mut children: [Option<NodeRef>; 16] = Default::default();
                for (index, slot) in children.iter_mut().enumerate() {
                    *slot = NodeRef::decode(&rlp.at(index)?)?;
                }
                let value = rlp.at(16)?.data()?;
                Ok(TrieNode::Branch {
                    children: Box::new(children),
                    value: (!value.is_empty()).then(|| value.to_vec()),
                })
            }
            count => Err(StateError::InvalidTrieNode(format!("list of {count} items"))),
        }
    }

    /// Compute Keccak256 hash of RLP-encoded node.
    pub fn hash(&self) -> H256 {
        keccak256(&self.rlp_encode())
    }
}

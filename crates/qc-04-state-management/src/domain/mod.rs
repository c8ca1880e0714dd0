pub mod entities;
pub mod errors;
pub mod nibbles;
pub mod node;
pub mod trie;

pub use entities::*;
pub use errors::*;
pub use nibbles::Nibbles;
pub use node::{NodeRef, TrieNode};
pub use trie::*;

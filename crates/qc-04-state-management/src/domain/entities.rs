//! # Domain Entities for State Management
//!
//! ## Type Decisions
//!
//! - `balance: U256` - Genesis allocations routinely exceed `u128` (a
//!   developer faucet is funded with `2^256 - 9`), so balances are full
//!   256-bit values.
//! - Accounts and storage slots are keyed in the trie by the Keccak256 of the
//!   address or slot ("secure trie"), which bounds path length and spreads
//!   keys evenly.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::{H256, U256, EMPTY_CODE_HASH, EMPTY_ROOT_HASH};

/// Account state stored in the Patricia Merkle Trie.
///
/// RLP-encoded as: [nonce, balance, storage_root, code_hash]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    /// Root of the account's storage trie (EMPTY_ROOT_HASH if empty).
    pub storage_root: H256,
    /// Keccak256 of the contract code (EMPTY_CODE_HASH for non-contract accounts).
    pub code_hash: H256,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            storage_root: EMPTY_ROOT_HASH,
            code_hash: EMPTY_CODE_HASH,
        }
    }
}

impl Encodable for Account {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.nonce);
        s.append(&self.balance);
        s.append(&self.storage_root);
        s.append(&self.code_hash);
    }
}

impl Decodable for Account {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Account {
            nonce: rlp.val_at(0)?,
            balance: rlp.val_at(1)?,
            storage_root: rlp.val_at(2)?,
            code_hash: rlp.val_at(3)?,
        })
    }
}

/// Trie encoding of a storage word: the RLP string of the value with leading
/// zero bytes trimmed. Zero words are not stored at all.
pub fn encode_storage_value(value: &H256) -> Vec<u8> {
    rlp::encode(&U256::from_big_endian(value.as_bytes())).to_vec()
}

pub fn decode_storage_value(encoded: &[u8]) -> Result<H256, DecoderError> {
    let value: U256 = rlp::decode(encoded)?;
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    Ok(H256(word))
}

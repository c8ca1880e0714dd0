//! # Block Entities
//!
//! Header and body layout follow the canonical RLP field order so that a
//! block hash computed here agrees with every other node.

use crate::primitives::{keccak256, Address, Bloom, H256, H64, U256, EMPTY_ROOT_HASH, EMPTY_UNCLE_HASH};
use crate::transaction::Transaction;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Encode a 64-bit seal nonce as the fixed 8-byte header field.
pub fn encode_nonce(nonce: u64) -> H64 {
    H64::from_low_u64_be(nonce)
}

/// Block header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub parent_hash: H256,
    pub uncle_hash: H256,
    pub coinbase: Address,
    pub root: H256,
    pub tx_hash: H256,
    pub receipt_hash: H256,
    pub bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub time: u64,
    pub extra: Vec<u8>,
    pub mix_digest: H256,
    pub nonce: H64,
    /// Present only once the base-fee market is active.
    pub base_fee: Option<U256>,
}

impl Header {
    /// Keccak256 of the RLP encoding.
    pub fn hash(&self) -> H256 {
        keccak256(&rlp::encode(self))
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(if self.base_fee.is_some() { 16 } else { 15 });
        s.append(&self.parent_hash);
        s.append(&self.uncle_hash);
        s.append(&self.coinbase);
        s.append(&self.root);
        s.append(&self.tx_hash);
        s.append(&self.receipt_hash);
        s.append(&self.bloom);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.time);
        s.append(&self.extra);
        s.append(&self.mix_digest);
        s.append(&self.nonce);
        if let Some(base_fee) = &self.base_fee {
            s.append(base_fee);
        }
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = rlp.item_count()?;
        if count != 15 && count != 16 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Header {
            parent_hash: rlp.val_at(0)?,
            uncle_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            root: rlp.val_at(3)?,
            tx_hash: rlp.val_at(4)?,
            receipt_hash: rlp.val_at(5)?,
            bloom: rlp.val_at(6)?,
            difficulty: rlp.val_at(7)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            time: rlp.val_at(11)?,
            extra: rlp.val_at(12)?,
            mix_digest: rlp.val_at(13)?,
            nonce: rlp.val_at(14)?,
            base_fee: if count == 16 { Some(rlp.val_at(15)?) } else { None },
        })
    }
}

/// Transactions and ommers of a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<Header>,
}

impl Encodable for BlockBody {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append_list::<Transaction, _>(&self.transactions);
        s.append_list::<Header, _>(&self.uncles);
    }
}

impl Decodable for BlockBody {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(BlockBody {
            transactions: rlp.list_at(0)?,
            uncles: rlp.list_at(1)?,
        })
    }
}

/// A header together with its body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub body: BlockBody,
}

impl Block {
    /// Block with no transactions, receipts or ommers. The body roots of the
    /// header are replaced with the canonical empty values.
    pub fn with_empty_body(mut header: Header) -> Self {
        header.tx_hash = EMPTY_ROOT_HASH;
        header.receipt_hash = EMPTY_ROOT_HASH;
        header.uncle_hash = EMPTY_UNCLE_HASH;
        header.bloom = Bloom::zero();
        Self {
            header,
            body: BlockBody::default(),
        }
    }

    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }
}

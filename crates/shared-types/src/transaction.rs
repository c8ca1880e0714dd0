//! # Transaction Model
//!
//! Consensus transaction variants form a closed set (`TxData`). Every variant
//! implements `InnerTx`, the capability set of an ordinary signed
//! transaction. The priority variant additionally implements
//! `PrioritySigned`: it carries a second, independent signature proving
//! authorization by a registered priority transactor key.
//!
//! ## Wire Format
//!
//! - Legacy: `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`
//! - Dynamic fee: `0x02 || rlp([chainId, nonce, tipCap, feeCap, gas, to, value, data, accessList, v, r, s])`
//! - Priority: `0x04 || rlp([... dynamic fee fields ..., priorityV, priorityR, priorityS])`
//!
//! An absent `to` encodes as the empty string and means contract creation.
//!
//! ## Signing Payloads
//!
//! The sender signs `0x04 || rlp(9 unsigned fields)`, exactly as for a
//! dynamic fee transaction. The priority authority signs
//! `0x04 || rlp(9 unsigned fields ++ [v, r, s])`, binding its authorization to
//! one specific sender-signed transaction.

use crate::primitives::{keccak256, Address, H256, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

pub const LEGACY_TX_TYPE: u8 = 0x00;
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x02;
pub const PRIORITY_TX_TYPE: u8 = 0x04;

/// Address and storage slots a transaction declares it will touch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessTuple {
    pub address: Address,
    pub storage_keys: Vec<H256>,
}

pub type AccessList = Vec<AccessTuple>;

impl Encodable for AccessTuple {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list::<H256, _>(&self.storage_keys);
    }
}

impl Decodable for AccessTuple {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(AccessTuple {
            address: rlp.val_at(0)?,
            storage_keys: rlp.list_at(1)?,
        })
    }
}

fn append_to(s: &mut RlpStream, to: &Option<Address>) {
    match to {
        Some(address) => s.append(address),
        None => s.append_empty_data(),
    };
}

fn decode_to(rlp: &Rlp, index: usize) -> Result<Option<Address>, DecoderError> {
    let item = rlp.at(index)?;
    if item.is_empty() {
        Ok(None)
    } else {
        item.as_val().map(Some)
    }
}

fn expect_items(rlp: &Rlp, expected: usize) -> Result<(), DecoderError> {
    if rlp.item_count()? != expected {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(())
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Capability set shared by all transaction variants.
pub trait InnerTx {
    fn tx_type(&self) -> u8;
    fn chain_id(&self) -> U256;
    fn access_list(&self) -> &[AccessTuple];
    fn data(&self) -> &[u8];
    fn gas(&self) -> u64;
    fn gas_price(&self) -> U256;
    fn gas_tip_cap(&self) -> U256;
    fn gas_fee_cap(&self) -> U256;
    fn value(&self) -> U256;
    fn nonce(&self) -> u64;
    /// `None` means contract creation.
    fn to(&self) -> Option<Address>;
    fn raw_signature_values(&self) -> (U256, U256, U256);
    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256);
    /// Deep copy sharing no storage with `self`.
    fn copy(&self) -> TxData;
}

/// Second signature triple proving authorization by a priority transactor.
pub trait PrioritySigned: InnerTx {
    fn raw_priority_signature_values(&self) -> (U256, U256, U256);
    fn set_priority_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256);
}

// =============================================================================
// VARIANTS
// =============================================================================

/// Pre-typed transaction with a single gas price. The chain id is folded into
/// `v` (`v = recid + 35 + 2 * chainId`, or 27/28 without replay protection).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyTx {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl LegacyTx {
    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        append_to(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
    }

    /// EIP-155 signing hash, or the pre-155 hash when `chain_id` is zero.
    pub fn signature_hash(&self, chain_id: u64) -> H256 {
        let mut s = RlpStream::new();
        if chain_id == 0 {
            s.begin_list(6);
            self.append_unsigned(&mut s);
        } else {
            s.begin_list(9);
            self.append_unsigned(&mut s);
            s.append(&chain_id);
            s.append(&0u8);
            s.append(&0u8);
        }
        keccak256(&s.out())
    }
}

impl Encodable for LegacyTx {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(9);
        self.append_unsigned(s);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for LegacyTx {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 9)?;
        Ok(LegacyTx {
            nonce: rlp.val_at(0)?,
            gas_price: rlp.val_at(1)?,
            gas: rlp.val_at(2)?,
            to: decode_to(rlp, 3)?,
            value: rlp.val_at(4)?,
            data: rlp.val_at(5)?,
            v: rlp.val_at(6)?,
            r: rlp.val_at(7)?,
            s: rlp.val_at(8)?,
        })
    }
}

impl InnerTx for LegacyTx {
    fn tx_type(&self) -> u8 {
        LEGACY_TX_TYPE
    }

    fn chain_id(&self) -> U256 {
        derive_chain_id(self.v)
    }

    fn access_list(&self) -> &[AccessTuple] {
        &[]
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn gas_price(&self) -> U256 {
        self.gas_price
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_price
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_price
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        (self.v, self.r, self.s)
    }

    fn set_signature_values(&mut self, _chain_id: U256, v: U256, r: U256, s: U256) {
        self.v = v;
        self.r = r;
        self.s = s;
    }

    fn copy(&self) -> TxData {
        TxData::Legacy(self.clone())
    }
}

/// Chain id encoded in a legacy `v` value; zero when unprotected.
pub fn derive_chain_id(v: U256) -> U256 {
    if v == U256::from(27) || v == U256::from(28) || v < U256::from(35) {
        return U256::zero();
    }
    (v - U256::from(35)) / U256::from(2)
}

/// Fee-market transaction with tip and fee caps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DynamicFeeTx {
    pub chain_id: U256,
    pub nonce: u64,
    pub gas_tip_cap: U256,
    pub gas_fee_cap: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: AccessList,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl DynamicFeeTx {
    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&self.gas_tip_cap);
        s.append(&self.gas_fee_cap);
        s.append(&self.gas);
        append_to(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append_list::<AccessTuple, _>(&self.access_list);
    }

    pub fn signature_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(9);
        self.append_unsigned(&mut s);
        typed_hash(DYNAMIC_FEE_TX_TYPE, &s.out())
    }
}

impl Encodable for DynamicFeeTx {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(12);
        self.append_unsigned(s);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for DynamicFeeTx {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 12)?;
        Ok(DynamicFeeTx {
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            gas_tip_cap: rlp.val_at(2)?,
            gas_fee_cap: rlp.val_at(3)?,
            gas: rlp.val_at(4)?,
            to: decode_to(rlp, 5)?,
            value: rlp.val_at(6)?,
            data: rlp.val_at(7)?,
            access_list: rlp.list_at(8)?,
            v: rlp.val_at(9)?,
            r: rlp.val_at(10)?,
            s: rlp.val_at(11)?,
        })
    }
}

impl InnerTx for DynamicFeeTx {
    fn tx_type(&self) -> u8 {
        DYNAMIC_FEE_TX_TYPE
    }

    fn chain_id(&self) -> U256 {
        self.chain_id
    }

    fn access_list(&self) -> &[AccessTuple] {
        &self.access_list
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn gas_price(&self) -> U256 {
        self.gas_fee_cap
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_tip_cap
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_fee_cap
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        (self.v, self.r, self.s)
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        self.chain_id = chain_id;
        self.v = v;
        self.r = r;
        self.s = s;
    }

    fn copy(&self) -> TxData {
        TxData::DynamicFee(self.clone())
    }
}

/// Fee-market transaction carrying two independent signatures: `(v, r, s)`
/// by the sender and `(priority_v, priority_r, priority_s)` by a priority
/// transactor key. The two signers may differ.
///
/// All numeric fields are plain values, so a clone never aliases the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriorityTx {
    pub chain_id: U256,
    pub nonce: u64,
    /// a.k.a. maxPriorityFeePerGas
    pub gas_tip_cap: U256,
    /// a.k.a. maxFeePerGas
    pub gas_fee_cap: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: AccessList,

    pub v: U256,
    pub r: U256,
    pub s: U256,

    pub priority_v: U256,
    pub priority_r: U256,
    pub priority_s: U256,
}

impl PriorityTx {
    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&self.gas_tip_cap);
        s.append(&self.gas_fee_cap);
        s.append(&self.gas);
        append_to(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append_list::<AccessTuple, _>(&self.access_list);
    }

    fn append_sender_signature(&self, s: &mut RlpStream) {
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }

    /// Hash signed by the sender.
    pub fn signature_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(9);
        self.append_unsigned(&mut s);
        typed_hash(PRIORITY_TX_TYPE, &s.out())
    }

    /// Hash signed by the priority transactor. Covers the sender signature.
    pub fn priority_signature_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(12);
        self.append_unsigned(&mut s);
        self.append_sender_signature(&mut s);
        typed_hash(PRIORITY_TX_TYPE, &s.out())
    }
}

impl Encodable for PriorityTx {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(15);
        self.append_unsigned(s);
        self.append_sender_signature(s);
        s.append(&self.priority_v);
        s.append(&self.priority_r);
        s.append(&self.priority_s);
    }
}

impl Decodable for PriorityTx {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        expect_items(rlp, 15)?;
        Ok(PriorityTx {
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            gas_tip_cap: rlp.val_at(2)?,
            gas_fee_cap: rlp.val_at(3)?,
            gas: rlp.val_at(4)?,
            to: decode_to(rlp, 5)?,
            value: rlp.val_at(6)?,
            data: rlp.val_at(7)?,
            access_list: rlp.list_at(8)?,
            v: rlp.val_at(9)?,
            r: rlp.val_at(10)?,
            s: rlp.val_at(11)?,
            priority_v: rlp.val_at(12)?,
            priority_r: rlp.val_at(13)?,
            priority_s: rlp.val_at(14)?,
        })
    }
}

impl InnerTx for PriorityTx {
    fn tx_type(&self) -> u8 {
        PRIORITY_TX_TYPE
    }

    fn chain_id(&self) -> U256 {
        self.chain_id
    }

    fn access_list(&self) -> &[AccessTuple] {
        &self.access_list
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn gas_price(&self) -> U256 {
        self.gas_fee_cap
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_tip_cap
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_fee_cap
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        (self.v, self.r, self.s)
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        self.chain_id = chain_id;
        self.v = v;
        self.r = r;
        self.s = s;
    }

    fn copy(&self) -> TxData {
        TxData::Priority(self.clone())
    }
}

impl PrioritySigned for PriorityTx {
    fn raw_priority_signature_values(&self) -> (U256, U256, U256) {
        (self.priority_v, self.priority_r, self.priority_s)
    }

    fn set_priority_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        self.chain_id = chain_id;
        self.priority_v = v;
        self.priority_r = r;
        self.priority_s = s;
    }
}

fn typed_hash(tx_type: u8, payload: &[u8]) -> H256 {
    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.push(tx_type);
    buf.extend_from_slice(payload);
    keccak256(&buf)
}

// =============================================================================
// CLOSED VARIANT SET
// =============================================================================

/// The closed set of consensus transaction variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxData {
    Legacy(LegacyTx),
    DynamicFee(DynamicFeeTx),
    Priority(PriorityTx),
}

macro_rules! dispatch {
    ($self:ident, $tx:ident => $body:expr) => {
        match $self {
            TxData::Legacy($tx) => $body,
            TxData::DynamicFee($tx) => $body,
            TxData::Priority($tx) => $body,
        }
    };
}

impl TxData {
    /// Priority capability, present only on the priority variant.
    pub fn as_priority(&self) -> Option<&PriorityTx> {
        match self {
            TxData::Priority(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_priority_mut(&mut self) -> Option<&mut PriorityTx> {
        match self {
            TxData::Priority(tx) => Some(tx),
            _ => None,
        }
    }
}

impl InnerTx for TxData {
    fn tx_type(&self) -> u8 {
        dispatch!(self, tx => tx.tx_type())
    }

    fn chain_id(&self) -> U256 {
        dispatch!(self, tx => tx.chain_id())
    }

    fn access_list(&self) -> &[AccessTuple] {
        dispatch!(self, tx => tx.access_list())
    }

    fn data(&self) -> &[u8] {
        dispatch!(self, tx => tx.data())
    }

    fn gas(&self) -> u64 {
        dispatch!(self, tx => tx.gas())
    }

    fn gas_price(&self) -> U256 {
        dispatch!(self, tx => tx.gas_price())
    }

    fn gas_tip_cap(&self) -> U256 {
        dispatch!(self, tx => tx.gas_tip_cap())
    }

    fn gas_fee_cap(&self) -> U256 {
        dispatch!(self, tx => tx.gas_fee_cap())
    }

    fn value(&self) -> U256 {
        dispatch!(self, tx => tx.value())
    }

    fn nonce(&self) -> u64 {
        dispatch!(self, tx => tx.nonce())
    }

    fn to(&self) -> Option<Address> {
        dispatch!(self, tx => tx.to())
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        dispatch!(self, tx => tx.raw_signature_values())
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        dispatch!(self, tx => tx.set_signature_values(chain_id, v, r, s))
    }

    fn copy(&self) -> TxData {
        dispatch!(self, tx => tx.copy())
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// A transaction as it appears on the wire and in block bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    inner: TxData,
}

impl Transaction {
    pub fn new(inner: TxData) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &TxData {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut TxData {
        &mut self.inner
    }

    pub fn into_inner(self) -> TxData {
        self.inner
    }

    /// Canonical encoding: a plain list for legacy transactions, the type
    /// byte followed by the RLP payload otherwise.
    pub fn encode_envelope(&self) -> Vec<u8> {
        match &self.inner {
            TxData::Legacy(tx) => rlp::encode(tx).to_vec(),
            TxData::DynamicFee(tx) => typed_envelope(DYNAMIC_FEE_TX_TYPE, &rlp::encode(tx)),
            TxData::Priority(tx) => typed_envelope(PRIORITY_TX_TYPE, &rlp::encode(tx)),
        }
    }

    pub fn decode_envelope(bytes: &[u8]) -> Result<Self, DecoderError> {
        let (&first, payload) = bytes.split_first().ok_or(DecoderError::RlpIsTooShort)?;
        let inner = match first {
            byte if byte >= 0xc0 => TxData::Legacy(rlp::decode(bytes)?),
            DYNAMIC_FEE_TX_TYPE => TxData::DynamicFee(rlp::decode(payload)?),
            PRIORITY_TX_TYPE => TxData::Priority(rlp::decode(payload)?),
            _ => return Err(DecoderError::Custom("unsupported transaction type")),
        };
        Ok(Self { inner })
    }

    pub fn hash(&self) -> H256 {
        keccak256(&self.encode_envelope())
    }
}

fn typed_envelope(tx_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.push(tx_type);
    buf.extend_from_slice(payload);
    buf
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        match &self.inner {
            TxData::Legacy(tx) => tx.rlp_append(s),
            _ => {
                s.append(&self.encode_envelope());
            }
        }
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.is_list() {
            return Ok(Self::new(TxData::Legacy(LegacyTx::decode(rlp)?)));
        }
        Self::decode_envelope(rlp.data()?)
    }
}

impl From<TxData> for Transaction {
    fn from(inner: TxData) -> Self {
        Self::new(inner)
    }
}

//! # Registry Contract ABI
//!
//! Just enough of the contract ABI to talk to the registry:
//!
//! ```text
//! struct TransactorMeta { string publicKey; bool isGasPriceWaiver; string name; }
//! function getTransactors() returns (TransactorMeta[]);
//! function getTransactorByKey(string publicKey) returns (TransactorMeta);
//! ```
//!
//! Every offset and length read from contract output is bounds-checked
//! against the output before use.

use super::errors::AbiError;
use shared_types::keccak256;

pub const GET_TRANSACTORS: &str = "getTransactors()";
pub const GET_TRANSACTOR_BY_KEY: &str = "getTransactorByKey(string)";

const WORD: usize = 32;

/// One tuple as returned by the registry contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactorMeta {
    /// Hex-encoded uncompressed public key.
    pub public_key: String,
    pub is_gas_price_waiver: bool,
    pub name: String,
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let mut result = [0u8; 4];
    result.copy_from_slice(&keccak256(signature.as_bytes()).as_bytes()[..4]);
    result
}

/// Call data for a method without arguments.
pub fn encode_call(signature: &str) -> Vec<u8> {
    selector(signature).to_vec()
}

/// Call data for a method taking a single `string`.
pub fn encode_call_with_string(signature: &str, argument: &str) -> Vec<u8> {
    let mut data = encode_call(signature);
    data.extend_from_slice(&pad_usize(WORD));
    data.extend_from_slice(&encode_string(argument));
    data
}

/// Return data of `getTransactorByKey`.
pub fn encode_transactor(meta: &TransactorMeta) -> Vec<u8> {
    let mut data = pad_usize(WORD).to_vec();
    data.extend_from_slice(&encode_tuple(meta));
    data
}

/// Return data of `getTransactors`.
pub fn encode_transactors(metas: &[TransactorMeta]) -> Vec<u8> {
    let tuples: Vec<Vec<u8>> = metas.iter().map(encode_tuple).collect();

    let mut data = pad_usize(WORD).to_vec();
    data.extend_from_slice(&pad_usize(metas.len()));
    let mut offset = metas.len() * WORD;
    for tuple in &tuples {
        data.extend_from_slice(&pad_usize(offset));
        offset += tuple.len();
    }
    for tuple in tuples {
        data.extend_from_slice(&tuple);
    }
    data
}

/// Decode the return data of `getTransactorByKey`.
pub fn decode_transactor(output: &[u8]) -> Result<TransactorMeta, AbiError> {
    let decoder = Decoder { data: output };
    let tuple = decoder.read_offset(0, 0)?;
    decoder.read_tuple(tuple)
}

/// Decode the return data of `getTransactors`.
pub fn decode_transactors(output: &[u8]) -> Result<Vec<TransactorMeta>, AbiError> {
    let decoder = Decoder { data: output };
    let array = decoder.read_offset(0, 0)?;
    let len = decoder.read_usize(array)?;
    let items = checked(array, WORD)?;

    let mut metas = Vec::with_capacity(len);
    for index in 0..len {
        let tuple = decoder.read_offset(items, index * WORD)?;
        metas.push(decoder.read_tuple(tuple)?);
    }
    Ok(metas)
}

fn pad_usize(value: usize) -> [u8; WORD] {
    let mut padded = [0u8; WORD];
    padded[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    padded
}

fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut data = pad_usize(bytes.len()).to_vec();
    data.extend_from_slice(bytes);
    data.resize(WORD + padded_len, 0);
    data
}

fn encode_tuple(meta: &TransactorMeta) -> Vec<u8> {
    let public_key = encode_string(&meta.public_key);
    let name = encode_string(&meta.name);

    let mut data = pad_usize(3 * WORD).to_vec();
    let mut flag = [0u8; WORD];
    flag[WORD - 1] = meta.is_gas_price_waiver as u8;
    data.extend_from_slice(&flag);
    data.extend_from_slice(&pad_usize(3 * WORD + public_key.len()));
    data.extend_from_slice(&public_key);
    data.extend_from_slice(&name);
    data
}

fn checked(base: usize, offset: usize) -> Result<usize, AbiError> {
    base.checked_add(offset)
        .ok_or_else(|| AbiError::InvalidOffset(format!("{base:x}+{offset:x}")))
}

struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let out_of_bounds = || AbiError::OutOfBounds {
            offset,
            needed: len,
            available: self.data.len(),
        };
        let end = offset.checked_add(len).ok_or_else(out_of_bounds)?;
        self.data.get(offset..end).ok_or_else(out_of_bounds)
    }

    /// A word holding an offset or length. Anything larger than the output
    /// cannot be valid.
    fn read_usize(&self, offset: usize) -> Result<usize, AbiError> {
        let word = self.slice(offset, WORD)?;
        let (high, low) = word.split_at(WORD - 8);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(low);
        let value = u64::from_be_bytes(bytes);
        if high.iter().any(|b| *b != 0) || value > self.data.len() as u64 {
            return Err(AbiError::InvalidOffset(
                word.iter().map(|b| format!("{b:02x}")).collect(),
            ));
        }
        Ok(value as usize)
    }

    /// Offset stored at `base + head`, resolved relative to `base`.
    fn read_offset(&self, base: usize, head: usize) -> Result<usize, AbiError> {
        let relative = self.read_usize(checked(base, head)?)?;
        checked(base, relative)
    }

    fn read_bool(&self, offset: usize) -> Result<bool, AbiError> {
        let word = self.slice(offset, WORD)?;
        if word[..WORD - 1].iter().any(|b| *b != 0) {
            return Err(AbiError::InvalidBool);
        }
        match word[WORD - 1] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(AbiError::InvalidBool),
        }
    }

    fn read_string(&self, offset: usize) -> Result<String, AbiError> {
        let len = self.read_usize(offset)?;
        let bytes = self.slice(checked(offset, WORD)?, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
    }

    fn read_tuple(&self, base: usize) -> Result<TransactorMeta, AbiError> {
        let public_key = self.read_string(self.read_offset(base, 0)?)?;
        let is_gas_price_waiver = self.read_bool(checked(base, WORD)?)?;
        let name = self.read_string(self.read_offset(base, 2 * WORD)?)?;
        Ok(TransactorMeta {
            public_key,
            is_gas_price_waiver,
            name,
        })
    }
}

//! # Chain Primitives
//!
//! Fixed-size hashes, addresses and 256-bit integers come from `ethereum-types`
//! so that their RLP and serde encodings match the rest of the network.

use crate::errors::PrimitiveError;
use sha3::{Digest, Keccak256};
use std::fmt;

pub use ethereum_types::{Address, Bloom, H160, H256, H64, U256};

/// Length of an uncompressed secp256k1 public key (`0x04 || X || Y`).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Length of a recoverable secp256k1 signature (`R || S || V`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Keccak256 of the RLP empty string: the root of an empty trie.
/// Value: 0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421
pub const EMPTY_ROOT_HASH: H256 = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// Keccak256 of empty bytes: the code hash of an account without code.
pub const EMPTY_CODE_HASH: H256 = H256([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Keccak256 of the RLP empty list: the uncle hash of a block without ommers.
pub const EMPTY_UNCLE_HASH: H256 = H256([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_slice(&hasher.finalize())
}

/// Uncompressed secp256k1 public key, the identity under which priority
/// transactors are registered on chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Build a key from raw bytes, left-padding shorter input with zeros.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() > PUBLIC_KEY_LENGTH {
            return Err(PrimitiveError::InvalidLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key[PUBLIC_KEY_LENGTH - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Parse a hex string with or without the `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, PrimitiveError> {
        let bytes = decode_hex(text)?;
        Self::from_slice(&bytes)
    }

    /// Parse registry-supplied text without failing. Undecodable hex yields
    /// the all-zero key and oversized input keeps its last 65 bytes.
    pub fn from_hex_lossy(text: &str) -> Self {
        let bytes = decode_hex(text).unwrap_or_default();
        let tail = &bytes[bytes.len().saturating_sub(PUBLIC_KEY_LENGTH)..];
        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key[PUBLIC_KEY_LENGTH - tail.len()..].copy_from_slice(tail);
        Self(key)
    }

    /// Lowercase hex without `0x`, the form the registry contract is keyed by.
    pub fn to_unprefixed_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Address owning this key: the last 20 bytes of `keccak256(X || Y)`.
    pub fn address(&self) -> Address {
        Address::from_slice(&keccak256(&self.0[1..]).as_bytes()[12..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(0x{})", self.to_unprefixed_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_unprefixed_hex())
    }
}

/// Decode hex text, tolerating a `0x` prefix and an odd number of digits.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, PrimitiveError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.map_err(|e| PrimitiveError::InvalidHex(format!("{text}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hashes_match_keccak() {
        assert_eq!(keccak256(&[0x80]), EMPTY_ROOT_HASH);
        assert_eq!(keccak256(&[]), EMPTY_CODE_HASH);
        assert_eq!(keccak256(&[0xc0]), EMPTY_UNCLE_HASH);
    }

    #[test]
    fn test_public_key_hex_accepts_prefix() {
        let raw = format!("04{}", "ab".repeat(64));
        let plain = PublicKey::from_hex(&raw).unwrap();
        let prefixed = PublicKey::from_hex(&format!("0x{raw}")).unwrap();

        assert_eq!(plain, prefixed);
        assert_eq!(plain.to_unprefixed_hex(), raw);
        assert_eq!(plain.0[0], 0x04);
    }

    #[test]
    fn test_public_key_left_pads_short_input() {
        let key = PublicKey::from_hex("0x0102").unwrap();
        assert_eq!(key.0[63], 0x01);
        assert_eq!(key.0[64], 0x02);
        assert!(key.0[..63].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_public_key_rejects_oversized_input() {
        let raw = "11".repeat(66);
        assert!(matches!(
            PublicKey::from_hex(&raw),
            Err(PrimitiveError::InvalidLength { expected: 65, actual: 66 })
        ));
    }

    #[test]
    fn test_public_key_lossy_parse() {
        let raw = format!("ff{}", "11".repeat(65));
        assert_eq!(PublicKey::from_hex_lossy(&raw), PublicKey([0x11; 65]));
        assert_eq!(PublicKey::from_hex_lossy("zz-not-hex"), PublicKey([0; 65]));
        assert_eq!(PublicKey::from_hex_lossy(""), PublicKey([0; 65]));

        let valid = format!("0x04{}", "ab".repeat(64));
        assert_eq!(PublicKey::from_hex_lossy(&valid), PublicKey::from_hex(&valid).unwrap());
    }

    #[test]
    fn test_decode_hex_odd_length() {
        assert_eq!(decode_hex("0xabc").unwrap(), vec![0x0a, 0xbc]);
        assert!(decode_hex("0xzz").is_err());
    }
}

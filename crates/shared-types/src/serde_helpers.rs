//! Serde adapters for the genesis file format.
//!
//! Numeric fields accept JSON numbers, decimal strings or `0x` hex strings and
//! are written back as hex. Byte fields are `0x` hex. Storage slots accept up
//! to 64 hex digits and are left-padded to 32 bytes.

use crate::errors::PrimitiveError;
use crate::primitives::{decode_hex, H256, U256};
use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

/// Parse a `u64` from decimal or `0x` hex text.
pub fn parse_u64(text: &str) -> Result<u64, PrimitiveError> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => text.parse::<u64>(),
    }
    .map_err(|e| PrimitiveError::InvalidNumber(format!("{text}: {e}")))
}

/// Parse a `U256` from decimal or `0x` hex text.
pub fn parse_u256(text: &str) -> Result<U256, PrimitiveError> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => {
            U256::from_str_radix(digits, 16).map_err(|e| PrimitiveError::InvalidNumber(format!("{text}: {e:?}")))
        }
        None => U256::from_dec_str(text).map_err(|e| PrimitiveError::InvalidNumber(format!("{text}: {e:?}"))),
    }
}

/// Parse a 32-byte storage word, left-padding short input.
pub fn parse_storage_word(text: &str) -> Result<H256, PrimitiveError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.len() > 64 {
        return Err(PrimitiveError::InvalidHex(format!(
            "too many hex characters in storage key/value {text:?}"
        )));
    }
    let bytes = decode_hex(digits)?;
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(H256(word))
}

struct U64Visitor;

impl<'de> Visitor<'de> for U64Visitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_u64(v).map_err(E::custom)
    }
}

struct U256Visitor;

impl<'de> Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v).map(U256::from).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_u256(v).map_err(E::custom)
    }
}

/// `u64` written as hex, read from number, decimal or hex.
pub mod u64_hex_or_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(U64Visitor)
    }
}

/// `U256` written as hex, read from number, decimal or hex.
pub mod u256_hex_or_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(U256Visitor)
    }
}

pub mod option_u256_hex_or_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::u256_hex_or_decimal::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = Option<U256>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("null, a number or a decimal/hex string")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(U256Visitor).map(Some)
            }
        }

        deserializer.deserialize_option(OptionVisitor)
    }
}

/// Byte strings as `0x` hex.
pub mod bytes_hex {
    use super::*;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_hex(&text).map_err(de::Error::custom)
    }
}

/// Contract storage maps with left-padded keys and values.
pub mod storage_map {
    use super::*;
    use serde::ser::SerializeMap;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<H256, H256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (key, word) in value {
            map.serialize_entry(&format!("{key:?}"), &format!("{word:?}"))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<H256, H256>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.iter()
            .map(|(key, word)| {
                let key = parse_storage_word(key).map_err(de::Error::custom)?;
                let word = parse_storage_word(word).map_err(de::Error::custom)?;
                Ok((key, word))
            })
            .collect()
    }
}

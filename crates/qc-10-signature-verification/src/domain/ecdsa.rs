//! # ECDSA (secp256k1)
//!
//! Prehash signing and public key recovery.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be STRICTLY LESS THAN SECP256K1_HALF_ORDER
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: Uses `subtle` crate for side-channel resistance

use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{Address, PublicKey, H256};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (for malleability check).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// A signature with its recovery id (`0` or `1`), before any
/// transaction-specific encoding of `v`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSignature {
    pub recovery_id: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Sign a 32-byte digest. The result always has a low S value.
pub fn sign_prehash(key: &SigningKey, hash: &H256) -> Result<RawSignature, SignatureError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(hash.as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let bytes = signature.to_bytes();
    let mut raw = RawSignature {
        recovery_id: recovery_id.to_byte(),
        r: [0u8; 32],
        s: [0u8; 32],
    };
    raw.r.copy_from_slice(&bytes[..32]);
    raw.s.copy_from_slice(&bytes[32..]);
    Ok(raw)
}

/// Recover the uncompressed public key that produced `signature` over `hash`.
///
/// Security validations performed:
/// 1. R and S are in valid range [1, n-1] per SEC1 standard
/// 2. S is in lower half per EIP-2 malleability protection
/// 3. Recovery ID is 0 or 1
/// 4. Public key recovery succeeds
pub fn recover_public_key(
    hash: &H256,
    signature: &RawSignature,
) -> Result<PublicKey, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }
    let recovery_id = RecoveryId::from_byte(signature.recovery_id)
        .filter(|id| !id.is_x_reduced())
        .ok_or_else(|| SignatureError::InvalidRecoveryId(signature.recovery_id.into()))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    let encoded = recovered.to_encoded_point(false);
    PublicKey::from_slice(encoded.as_bytes()).map_err(|_| SignatureError::RecoveryFailed)
}

/// Recover the signer's address from a signature.
pub fn recover_address(hash: &H256, signature: &RawSignature) -> Result<Address, SignatureError> {
    Ok(recover_public_key(hash, signature)?.address())
}

/// Public key of a signing key, in the same uncompressed form recovery yields.
pub fn public_key_of(key: &SigningKey) -> Result<PublicKey, SignatureError> {
    let encoded = key.verifying_key().to_encoded_point(false);
    PublicKey::from_slice(encoded.as_bytes()).map_err(|_| SignatureError::InvalidKey)
}

/// Check if S value is in lower half of curve order (EIP-2 malleability protection).
///
/// Per EIP-2: S must be STRICTLY LESS THAN half_order (not equal)
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER)
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    let not_zero: bool = (!is_zero).into();
    not_zero && ct_less_than(scalar, &SECP256K1_ORDER)
}

/// Constant-time `a < b` over big-endian bytes.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (a_byte, b_byte) in a.iter().zip(b.iter()) {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((a_byte < b_byte) as u8);
        let byte_greater = Choice::from((a_byte > b_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

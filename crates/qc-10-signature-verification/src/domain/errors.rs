//! # Signature Errors

use shared_types::U256;
use thiserror::Error;

/// Errors that can occur while signing or recovering a signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S outside [1, n-1], or not a valid signature encoding.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Recovery ID derived from `v` is not 0 or 1.
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(U256),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The private key could not be used for signing.
    #[error("Invalid signing key")]
    InvalidKey,

    /// The transaction was signed for a different chain.
    #[error("Chain ID mismatch: have {have}, want {want}")]
    ChainIdMismatch { have: U256, want: U256 },

    /// The transaction variant has no priority signature.
    #[error("Transaction type {0:#04x} does not carry a priority signature")]
    NotPriorityTransaction(u8),

    /// A signature recovered to the zero address.
    #[error("{0} signature recovered to the zero address")]
    ZeroSigner(&'static str),
}

//! # Signature Verification Subsystem (QC-10)
//!
//! Signs transactions and recovers their signers.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): secp256k1 recovery and signing, no I/O
//! - **Service Layer** (`service.rs`): `TxSigner`, which knows how each
//!   transaction variant encodes `v` and what hash each signature covers
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: Signatures with high S values are rejected
//! - **Two Independent Signers**: A priority transaction carries a sender
//!   signature and a priority signature. Each is recovered on its own; the
//!   two signers may differ.

pub mod domain;
pub mod service;

pub use domain::ecdsa::{
    public_key_of, recover_address, recover_public_key, sign_prehash, RawSignature,
};
pub use domain::errors::SignatureError;
pub use k256::ecdsa::SigningKey;
pub use service::TxSigner;

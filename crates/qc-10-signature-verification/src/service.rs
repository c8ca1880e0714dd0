//! # Transaction Signer
//!
//! Binds the ECDSA domain to the transaction variants: which digest each
//! signature covers and how the recovery id is folded into `v`.
//!
//! | Variant | Sender digest | `v` |
//! |---------|---------------|-----|
//! | Legacy | EIP-155 hash (pre-155 for `v` 27/28) | `recid + 35 + 2 * chainId` |
//! | DynamicFee | `keccak(0x02 ‖ rlp(fields))` | `recid` |
//! | Priority | `keccak(0x04 ‖ rlp(fields))` | `recid` |
//!
//! The priority signature of a priority transaction covers
//! `keccak(0x04 ‖ rlp(fields ‖ v, r, s))`, so it is bound to one particular
//! sender signature.

use crate::domain::ecdsa::{recover_address, recover_public_key, sign_prehash, RawSignature};
use crate::domain::errors::SignatureError;
use k256::ecdsa::SigningKey;
use shared_types::{
    derive_chain_id, Address, InnerTx, PrioritySigned, PriorityTx, PublicKey, TxData, H256, U256,
};
use tracing::trace;

/// Signs and recovers transactions for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSigner {
    chain_id: u64,
}

impl TxSigner {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn check_chain_id(&self, have: U256) -> Result<(), SignatureError> {
        let want = U256::from(self.chain_id);
        if have != want {
            return Err(SignatureError::ChainIdMismatch { have, want });
        }
        Ok(())
    }

    /// Digest covered by the sender signature.
    pub fn signature_hash(&self, tx: &TxData) -> H256 {
        match tx {
            TxData::Legacy(legacy) => legacy.signature_hash(self.chain_id),
            TxData::DynamicFee(dynamic) => dynamic.signature_hash(),
            TxData::Priority(priority) => priority.signature_hash(),
        }
    }

    /// Sign `tx` as its sender, replacing any previous sender signature.
    pub fn sign(&self, tx: &mut TxData, key: &SigningKey) -> Result<(), SignatureError> {
        let chain_id = U256::from(self.chain_id);
        if !matches!(tx, TxData::Legacy(_)) {
            self.check_chain_id(tx.chain_id())?;
        }
        let raw = sign_prehash(key, &self.signature_hash(tx))?;
        let v = match tx {
            TxData::Legacy(_) if self.chain_id == 0 => U256::from(27 + raw.recovery_id as u64),
            TxData::Legacy(_) => {
                U256::from(raw.recovery_id) + U256::from(35) + chain_id * U256::from(2)
            }
            _ => U256::from(raw.recovery_id),
        };
        tx.set_signature_values(chain_id, v, word(&raw.r), word(&raw.s));
        Ok(())
    }

    /// Recover the sender address.
    pub fn sender(&self, tx: &TxData) -> Result<Address, SignatureError> {
        let (v, r, s) = tx.raw_signature_values();
        let (hash, recovery_id) = match tx {
            TxData::Legacy(legacy) => {
                if v == U256::from(27) || v == U256::from(28) {
                    (legacy.signature_hash(0), v - U256::from(27))
                } else {
                    self.check_chain_id(derive_chain_id(v))?;
                    let offset = U256::from(35) + U256::from(self.chain_id) * U256::from(2);
                    let recovery_id = v
                        .checked_sub(offset)
                        .ok_or(SignatureError::InvalidRecoveryId(v))?;
                    (legacy.signature_hash(self.chain_id), recovery_id)
                }
            }
            _ => {
                self.check_chain_id(tx.chain_id())?;
                (self.signature_hash(tx), v)
            }
        };
        let address = recover_address(&hash, &raw_signature(recovery_id, r, s)?)?;
        trace!(?address, tx_type = tx.tx_type(), "recovered sender");
        Ok(address)
    }

    /// Add the priority signature. The sender signature must already be in
    /// place, since the priority digest covers it.
    pub fn sign_priority(&self, tx: &mut PriorityTx, key: &SigningKey) -> Result<(), SignatureError> {
        self.check_chain_id(tx.chain_id)?;
        let raw = sign_prehash(key, &tx.priority_signature_hash())?;
        tx.set_priority_signature_values(
            tx.chain_id,
            U256::from(raw.recovery_id),
            word(&raw.r),
            word(&raw.s),
        );
        Ok(())
    }

    /// Public key behind the priority signature, the identity the priority
    /// transactor registry is keyed by.
    pub fn priority_public_key(&self, tx: &PriorityTx) -> Result<PublicKey, SignatureError> {
        self.check_chain_id(tx.chain_id)?;
        let (v, r, s) = tx.raw_priority_signature_values();
        recover_public_key(&tx.priority_signature_hash(), &raw_signature(v, r, s)?)
    }

    pub fn priority_sender(&self, tx: &PriorityTx) -> Result<Address, SignatureError> {
        Ok(self.priority_public_key(tx)?.address())
    }

    /// Recover both signers of a priority transaction. Fails unless each
    /// signature independently recovers to a non-zero address.
    pub fn recover_priority_signers(
        &self,
        tx: &TxData,
    ) -> Result<(Address, PublicKey), SignatureError> {
        let priority = tx
            .as_priority()
            .ok_or(SignatureError::NotPriorityTransaction(tx.tx_type()))?;
        let sender = self.sender(tx)?;
        if sender.is_zero() {
            return Err(SignatureError::ZeroSigner("sender"));
        }
        let public_key = self.priority_public_key(priority)?;
        if public_key.address().is_zero() {
            return Err(SignatureError::ZeroSigner("priority"));
        }
        Ok((sender, public_key))
    }
}

fn word(bytes: &[u8; 32]) -> U256 {
    U256::from_big_endian(bytes)
}

fn raw_signature(recovery_id: U256, r: U256, s: U256) -> Result<RawSignature, SignatureError> {
    if recovery_id > U256::one() {
        return Err(SignatureError::InvalidRecoveryId(recovery_id));
    }
    let mut signature = RawSignature {
        recovery_id: recovery_id.low_u32() as u8,
        r: [0u8; 32],
        s: [0u8; 32],
    };
    r.to_big_endian(&mut signature.r);
    s.to_big_endian(&mut signature.s);
    Ok(signature)
}

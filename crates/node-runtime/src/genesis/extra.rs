//! # BFT Genesis Extra Data
//!
//! The validator set of a BFT chain lives in the genesis extra data as
//!
//! ```text
//! rlp([vanity(32), [validator, ...], vote | [], round, [seal, ...]])
//! ```
//!
//! At genesis the vote is absent (encoded as an empty list), the round is
//! zero and there are no committed seals. Validator order is significant.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use shared_types::{Address, SIGNATURE_LENGTH};

/// Length of the vanity prefix.
pub const EXTRA_VANITY: usize = 32;

/// Length of one seal. Signer-list extra data reserves one trailing seal.
pub const EXTRA_SEAL: usize = SIGNATURE_LENGTH;

const VOTE_ADD: u8 = 0xff;
const VOTE_DROP: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteType {
    Add,
    Drop,
}

/// Proposal to add or remove a validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatorVote {
    pub recipient: Address,
    pub vote_type: VoteType,
}

impl Encodable for ValidatorVote {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.recipient);
        s.append(&match self.vote_type {
            VoteType::Add => VOTE_ADD,
            VoteType::Drop => VOTE_DROP,
        });
    }
}

impl Decodable for ValidatorVote {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let vote_type = match rlp.val_at::<u8>(1)? {
            VOTE_ADD => VoteType::Add,
            VOTE_DROP => VoteType::Drop,
            _ => return Err(DecoderError::Custom("unknown vote type")),
        };
        Ok(Self {
            recipient: rlp.val_at(0)?,
            vote_type,
        })
    }
}

/// Decoded BFT extra data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IbftExtra {
    pub vanity: [u8; EXTRA_VANITY],
    pub validators: Vec<Address>,
    pub vote: Option<ValidatorVote>,
    pub round: u32,
    pub committed_seals: Vec<Vec<u8>>,
}

impl IbftExtra {
    /// Genesis extra for `validators`, in the given order.
    pub fn genesis(validators: &[Address]) -> Self {
        Self {
            validators: validators.to_vec(),
            ..Default::default()
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(raw: &[u8]) -> Result<Self, DecoderError> {
        rlp::decode(raw)
    }
}

impl Encodable for IbftExtra {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.vanity.to_vec());
        s.append_list::<Address, _>(&self.validators);
        match &self.vote {
            Some(vote) => s.append(vote),
            None => s.begin_list(0),
        };
        s.append(&self.round);
        s.begin_list(self.committed_seals.len());
        for seal in &self.committed_seals {
            s.append(seal);
        }
    }
}

impl Decodable for IbftExtra {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 5 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let vanity_rlp = rlp.at(0)?;
        let vanity_bytes = vanity_rlp.data()?;
        if vanity_bytes.len() != EXTRA_VANITY {
            return Err(DecoderError::RlpInvalidLength);
        }
        let mut vanity = [0u8; EXTRA_VANITY];
        vanity.copy_from_slice(vanity_bytes);

        let vote_rlp = rlp.at(2)?;
        let vote = if vote_rlp.is_list() && vote_rlp.item_count()? == 0 {
            None
        } else {
            Some(vote_rlp.as_val()?)
        };

        Ok(Self {
            vanity,
            validators: rlp.list_at(1)?,
            vote,
            round: rlp.val_at(3)?,
            committed_seals: rlp.list_at(4)?,
        })
    }
}

/// Encoded genesis extra data for a BFT validator set.
pub fn genesis_extra_for_validators(validators: &[Address]) -> Vec<u8> {
    IbftExtra::genesis(validators).encode()
}

/// Signer-list extra data: vanity, signer addresses, then an empty seal.
pub fn clique_extra_for_signers(signers: &[Address]) -> Vec<u8> {
    let mut extra = vec![0u8; EXTRA_VANITY];
    for signer in signers {
        extra.extend_from_slice(signer.as_bytes());
    }
    extra.resize(extra.len() + EXTRA_SEAL, 0);
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::decode_hex;

    // Five-validator staging network extra data.
    const STAGENET_EXTRA: &str = "0xf88fa00000000000000000000000000000000000000000000000000000000000000000f86994c21ee98b5a90a6a45aba37fa5eddf90f5e8e181694ff0d56bd960c455a71f908496c79e8eafec34ccf9407afbe0d7d36b80454be1e185f55e02b9453625a944f9a82d7e094de7fb70d9ce2033ec0d65ac311249497f060952b1008c75cb030e3599725ad5cc306a2c080c0";

    fn address(text: &str) -> Address {
        Address::from_slice(&decode_hex(text).unwrap())
    }

    #[test]
    fn test_known_extra_decodes() {
        let extra = IbftExtra::decode(&decode_hex(STAGENET_EXTRA).unwrap()).unwrap();
        assert_eq!(extra.vanity, [0u8; EXTRA_VANITY]);
        assert_eq!(extra.vote, None);
        assert_eq!(extra.round, 0);
        assert!(extra.committed_seals.is_empty());
        assert_eq!(
            extra.validators,
            vec![
                address("0xc21ee98b5a90a6a45aba37fa5eddf90f5e8e1816"),
                address("0xff0d56bd960c455a71f908496c79e8eafec34ccf"),
                address("0x07afbe0d7d36b80454be1e185f55e02b9453625a"),
                address("0x4f9a82d7e094de7fb70d9ce2033ec0d65ac31124"),
                address("0x97f060952b1008c75cb030e3599725ad5cc306a2"),
            ]
        );
    }

    #[test]
    fn test_genesis_encoding_matches_known_extra() {
        let extra = IbftExtra::decode(&decode_hex(STAGENET_EXTRA).unwrap()).unwrap();
        assert_eq!(
            genesis_extra_for_validators(&extra.validators),
            decode_hex(STAGENET_EXTRA).unwrap()
        );
    }

    #[test]
    fn test_validator_order_is_preserved() {
        let a = Address::repeat_byte(0x01);
        let b = Address::repeat_byte(0x02);
        assert_ne!(
            genesis_extra_for_validators(&[a, b]),
            genesis_extra_for_validators(&[b, a])
        );
    }

    #[test]
    fn test_vote_and_seals_survive_decoding() {
        let extra = IbftExtra {
            vanity: [0x11; EXTRA_VANITY],
            validators: vec![Address::repeat_byte(0xaa)],
            vote: Some(ValidatorVote {
                recipient: Address::repeat_byte(0xbb),
                vote_type: VoteType::Drop,
            }),
            round: 3,
            committed_seals: vec![vec![0x01; EXTRA_SEAL]],
        };
        assert_eq!(IbftExtra::decode(&extra.encode()).unwrap(), extra);
    }

    #[test]
    fn test_short_vanity_rejected() {
        let mut s = RlpStream::new_list(5);
        s.append(&vec![0u8; 31]);
        s.begin_list(0);
        s.begin_list(0);
        s.append(&0u32);
        s.begin_list(0);
        assert_eq!(
            IbftExtra::decode(&s.out()),
            Err(DecoderError::RlpInvalidLength)
        );
    }

    #[test]
    fn test_clique_extra_layout() {
        let signer = Address::repeat_byte(0x42);
        let extra = clique_extra_for_signers(&[signer]);
        assert_eq!(extra.len(), EXTRA_VANITY + 20 + EXTRA_SEAL);
        assert_eq!(&extra[EXTRA_VANITY..EXTRA_VANITY + 20], signer.as_bytes());
    }
}

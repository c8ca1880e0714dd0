//! # World State
//!
//! `StateDb` holds account objects keyed by `keccak256(address)`. Each object
//! owns its storage trie (keyed by `keccak256(slot)`) and its code. A commit
//! writes storage tries, code and finally the account trie, returning the
//! state root.

use crate::domain::{
    decode_storage_value, encode_storage_value, Account, PatriciaMerkleTrie, StateError,
};
use crate::ports::TrieDatabase;
use shared_types::{keccak256, Address, H256, U256, EMPTY_CODE_HASH};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug, Default)]
struct StateObject {
    account: Account,
    code: Vec<u8>,
    storage: PatriciaMerkleTrie,
}

/// Mutable view of the world state.
#[derive(Clone, Debug, Default)]
pub struct StateDb {
    objects: BTreeMap<H256, StateObject>,
}

impl StateDb {
    /// Fresh, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the committed state rooted at `root`.
    ///
    /// Every account, storage trie and code blob is loaded, so an error here
    /// means the state is not fully readable from `db`.
    pub fn open<D: TrieDatabase + ?Sized>(root: H256, db: &D) -> Result<Self, StateError> {
        let accounts = PatriciaMerkleTrie::load(root, db)?;
        let mut objects = BTreeMap::new();
        for (key, encoded) in accounts.iter() {
            let account: Account = rlp::decode(encoded)?;
            let storage = PatriciaMerkleTrie::load(account.storage_root, db)?;
            let code = if account.code_hash == EMPTY_CODE_HASH {
                Vec::new()
            } else {
                db.get_code(&account.code_hash)?
                    .ok_or(StateError::MissingCode(account.code_hash))?
            };
            objects.insert(
                H256::from_slice(key),
                StateObject {
                    account,
                    code,
                    storage,
                },
            );
        }
        debug!(?root, accounts = objects.len(), "opened state");
        Ok(Self { objects })
    }

    fn object(&self, address: &Address) -> Option<&StateObject> {
        self.objects.get(&keccak256(address.as_bytes()))
    }

    fn object_mut(&mut self, address: &Address) -> &mut StateObject {
        self.objects
            .entry(keccak256(address.as_bytes()))
            .or_default()
    }

    /// Whether the account has been touched or loaded.
    pub fn exists(&self, address: &Address) -> bool {
        self.object(address).is_some()
    }

    /// Add to the balance, creating the account if needed. Saturates at
    /// `U256::MAX`.
    pub fn add_balance(&mut self, address: &Address, amount: U256) {
        let account = &mut self.object_mut(address).account;
        account.balance = account.balance.saturating_add(amount);
    }

    pub fn set_nonce(&mut self, address: &Address, nonce: u64) {
        self.object_mut(address).account.nonce = nonce;
    }

    pub fn set_code(&mut self, address: &Address, code: Vec<u8>) {
        let object = self.object_mut(address);
        object.account.code_hash = keccak256(&code);
        object.code = code;
    }

    /// Write a storage slot. Zero values delete the slot.
    pub fn set_state(&mut self, address: &Address, key: H256, value: H256) {
        let slot = keccak256(key.as_bytes());
        let storage = &mut self.object_mut(address).storage;
        if value.is_zero() {
            storage.remove(slot.as_bytes());
        } else {
            storage.insert(slot.as_bytes(), encode_storage_value(&value));
        }
    }

    pub fn get_balance(&self, address: &Address) -> U256 {
        self.object(address)
            .map(|o| o.account.balance)
            .unwrap_or_default()
    }

    pub fn get_nonce(&self, address: &Address) -> u64 {
        self.object(address).map(|o| o.account.nonce).unwrap_or(0)
    }

    pub fn get_code(&self, address: &Address) -> &[u8] {
        self.object(address).map(|o| o.code.as_slice()).unwrap_or(&[])
    }

    pub fn get_state(&self, address: &Address, key: H256) -> Result<H256, StateError> {
        let slot = keccak256(key.as_bytes());
        match self.object(address).and_then(|o| o.storage.get(slot.as_bytes())) {
            Some(encoded) => Ok(decode_storage_value(encoded)?),
            None => Ok(H256::zero()),
        }
    }

    /// State root of the current content without writing anything.
    pub fn intermediate_root(&self) -> H256 {
        self.account_trie().root_hash()
    }

    fn account_trie(&self) -> PatriciaMerkleTrie {
        let mut trie = PatriciaMerkleTrie::new();
        for (key, object) in &self.objects {
            let account = Account {
                storage_root: object.storage.root_hash(),
                ..object.account.clone()
            };
            trie.insert(key.as_bytes(), rlp::encode(&account).to_vec());
        }
        trie
    }

    /// Persist storage tries, code and the account trie; return the root.
    pub fn commit<D: TrieDatabase + ?Sized>(&mut self, db: &mut D) -> Result<H256, StateError> {
        let mut accounts = PatriciaMerkleTrie::new();
        for (key, object) in self.objects.iter_mut() {
            object.account.storage_root = object.storage.commit(db)?;
            if object.account.code_hash != EMPTY_CODE_HASH {
                db.put_code(object.account.code_hash, object.code.clone())?;
            }
            accounts.insert(key.as_bytes(), rlp::encode(&object.account).to_vec());
        }
        let root = accounts.commit(db)?;
        debug!(?root, accounts = self.objects.len(), "committed state");
        Ok(root)
    }
}

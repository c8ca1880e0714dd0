use shared_types::PublicKey;
use std::collections::HashMap;

/// A registered priority transactor. Only exists at query time; it is
/// recomputed from contract state on every lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriorityTransactor {
    pub entity_name: String,
    pub is_gas_price_waiver: bool,
}

/// Transactors keyed by their uncompressed public key.
pub type PriorityTransactorMap = HashMap<PublicKey, PriorityTransactor>;

use crate::ports::outbound::StateView;
use qc_04_state_management::StateDb;
use shared_types::Address;

impl StateView for StateDb {
    fn has_code(&self, address: &Address) -> bool {
        !self.get_code(address).is_empty()
    }
}

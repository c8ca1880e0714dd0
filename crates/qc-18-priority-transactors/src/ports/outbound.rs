//! # Driven Ports (SPI - Outbound)
//!
//! What the registry needs from the node: a read view of the state snapshot
//! and an EVM able to run a read-only call against that same snapshot.

use shared_types::Address;
use thiserror::Error;

/// Read access to account code in a state snapshot.
pub trait StateView {
    /// Whether contract code is deployed at `address`.
    fn has_code(&self, address: &Address) -> bool;
}

/// Failure of a static call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// Execution reverted; carries the revert data.
    #[error("execution reverted")]
    Reverted(Vec<u8>),

    #[error("out of gas")]
    OutOfGas,

    #[error("execution failed: {0}")]
    Failed(String),
}

/// Bounded, state-mutation-free contract call.
///
/// Implementations must run against the same snapshot the paired `StateView`
/// reads, and must reject any state write.
pub trait StaticCallExecutor {
    fn static_call(
        &self,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
    ) -> Result<Vec<u8>, ExecutionError>;
}

use crate::ports::outbound::ExecutionError;
use thiserror::Error;

/// Malformed contract output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("output too short: need {needed} bytes at offset {offset}, have {available}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("offset or length word does not fit: 0x{0}")]
    InvalidOffset(String),

    #[error("improperly encoded boolean value")]
    InvalidBool,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors surfaced by `PriorityTransactorRegistry::resolve_all`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("priority transactor contract call failed: {0}")]
    ContractCall(#[from] ExecutionError),

    #[error("priority transactor response could not be decoded: {0}")]
    Decode(#[from] AbiError),
}

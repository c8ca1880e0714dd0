//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while parsing primitive values from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected at most {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Fork activation heights of a chain configuration are not monotonic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForkOrderError {
    #[error("unsupported fork ordering: {previous} not enabled, but {next} enabled at {next_block}")]
    NotEnabled {
        previous: &'static str,
        next: &'static str,
        next_block: u64,
    },

    #[error("unsupported fork ordering: {previous} enabled at {previous_block}, but {next} enabled at {next_block}")]
    Misordered {
        previous: &'static str,
        previous_block: u64,
        next: &'static str,
        next_block: u64,
    },

    #[error("priority transactor contract transitions must strictly increase: block {previous} followed by block {next}")]
    ContractTransition { previous: u64, next: u64 },
}

/// A new chain configuration would change rules for blocks already in the
/// local chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "mismatching {what} in database (have {}, want {}, rewindto {rewind_to})",
    display_block(.stored),
    display_block(.new)
)]
pub struct ConfigCompatError {
    pub what: &'static str,
    /// Activation height in the stored configuration.
    pub stored: Option<u64>,
    /// Activation height in the new configuration.
    pub new: Option<u64>,
    /// Highest block the local chain must be rewound to.
    pub rewind_to: u64,
}

fn display_block(block: &Option<u64>) -> String {
    match block {
        Some(number) => number.to_string(),
        None => "nil".to_string(),
    }
}

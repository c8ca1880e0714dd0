//! # Domain Errors
//!
//! Error types for the Block Storage subsystem.

use qc_04_state_management::StateError;
use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Database I/O error.
    DatabaseError { message: String },

    /// Serialization/deserialization error.
    SerializationError { message: String },

    /// A stored record exists but does not have the expected shape.
    CorruptedRecord { what: &'static str, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseError { message } => write!(f, "Database error: {}", message),
            StorageError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            StorageError::CorruptedRecord { what, reason } => {
                write!(f, "Corrupted {} record: {}", what, reason)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Key-value store errors.
#[derive(Debug, Clone)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        StorageError::DatabaseError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<rlp::DecoderError> for StorageError {
    fn from(err: rlp::DecoderError) -> Self {
        StorageError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<KVStoreError> for StateError {
    fn from(err: KVStoreError) -> Self {
        StateError::DatabaseError(err.to_string())
    }
}

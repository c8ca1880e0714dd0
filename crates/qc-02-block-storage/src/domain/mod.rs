//! # Domain Layer
//!
//! Key schema and error types. No I/O happens here.

pub mod errors;
pub mod keys;

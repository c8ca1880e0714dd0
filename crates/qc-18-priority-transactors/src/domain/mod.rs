//! # Domain Layer
//!
//! Pure logic: transactor entities and the registry contract's ABI.

pub mod abi;
pub mod entities;
pub mod errors;

//! # Quantum-Chain Test Suite
//!
//! Cross-crate flows of the genesis bootstrap and the priority transaction
//! path.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs      # Registry contract double, keys, genesis specs
//! └── integration/     # Cross-crate flows
//!     ├── genesis_flows.rs
//!     └── priority_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests
//! cargo test -p qc-tests integration::genesis_flows
//! cargo bench -p qc-tests
//! ```

pub mod fixtures;
pub mod integration;

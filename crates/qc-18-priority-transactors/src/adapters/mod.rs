//! # Adapters
//!
//! `StateView` over the world state kept by qc-04.

pub mod state_view;

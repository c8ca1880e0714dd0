//! # Integration Flows
//!
//! - `genesis_flows`: builder, store and reconciler across restarts
//! - `priority_flows`: signing, recovery and registry authorization

pub mod genesis_flows;
pub mod priority_flows;

//! # Ports
//!
//! The driven port the storage service needs from its host.

pub mod outbound;

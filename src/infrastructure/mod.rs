//! Infrastructure: configuration and the ledger RPC boundary.

pub mod config;
pub mod ledger;

//! Core payment functionality
//!
//! Token registry, request validation, transaction construction, wallet
//! signing, confirmation tracking, and the processor that orchestrates them.

pub mod confirmation;
pub mod processor;
pub mod tokens;
pub mod transactions;
pub mod validation;
pub mod wallet;

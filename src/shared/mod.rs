//! Shared types, constants, and utilities.

pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

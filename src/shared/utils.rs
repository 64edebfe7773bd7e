//! Utility functions for the payment core

/// Scale a human-readable amount into integer base units.
///
/// Floors rather than rounds: a sub-base-unit remainder must never debit an
/// extra unit from the payer.
pub fn to_base_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(i32::from(decimals))).floor() as u64
}

/// Scale integer base units back into a human-readable amount.
pub fn from_base_units(base_units: u64, decimals: u8) -> f64 {
    base_units as f64 / 10f64.powi(i32::from(decimals))
}

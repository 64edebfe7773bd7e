//! Constants for the payment core

/// Symbol of the network's native coin.
pub const NATIVE_SYMBOL: &str = "SOL";

/// Display name of the native coin.
pub const NATIVE_NAME: &str = "Solana";

/// Base-unit scale of the native coin (lamports per SOL is 10^9).
pub const NATIVE_DECIMALS: u8 = 9;

/// Transfer cap applied to the default native registry entry, in SOL.
pub const NATIVE_MAX_TRANSFER: f64 = 100.0;

/// Decimals applied to a registered token that does not specify any.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 9;

/// Transfer cap applied to a registered token that does not specify one.
pub const DEFAULT_MAX_TRANSFER: f64 = 1000.0;

/// Transaction page of the block explorer.
pub const EXPLORER_TX_BASE: &str = "https://solscan.io/tx";

// Confirmation defaults. Every one of these is overridable through
// `ProcessorConfig`; the values here are the consolidated defaults.
pub const DEFAULT_CONFIRMATION_DEPTH: usize = 32;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;

/// Default commitment used for RPC queries.
pub const DEFAULT_COMMITMENT: &str = "confirmed";

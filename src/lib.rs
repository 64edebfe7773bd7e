//! solpay-core
//!
//! Payment lifecycle core for Solana. Covers the whole path of one payment:
//! token registry, request validation, transaction construction for native
//! and SPL transfers, wallet signing, pre-flight simulation, and bounded
//! confirmation tracking.
//!
//! Typical use:
//!
//! ```no_run
//! use solpay_core::{init_payment_core, PaymentRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), solpay_core::PaymentError> {
//!     let processor = init_payment_core()?;
//!     let result = processor
//!         .send_payment(&PaymentRequest {
//!             recipient: "11111111111111111111111111111111".to_string(),
//!             amount: 0.1,
//!             token: "SOL".to_string(),
//!             memo: None,
//!         })
//!         .await?;
//!     println!("{}: {:?}", result.explorer_url, result.outcome);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod infrastructure;
pub mod shared;

use std::env;
use std::sync::Arc;

use solana_sdk::signature::read_keypair_file;

pub use crate::core::confirmation::ConfirmationEngine;
pub use crate::core::processor::PaymentProcessor;
pub use crate::core::tokens::TokenRegistry;
pub use crate::core::transactions::TransactionBuilder;
pub use crate::core::validation::{is_valid_address, validate_payment};
pub use crate::core::wallet::{KeypairWallet, WalletSigner};
pub use crate::infrastructure::config::ProcessorConfig;
pub use crate::infrastructure::ledger::{LedgerRpc, SignatureStatus, SolanaLedger};
pub use crate::shared::error::PaymentError;
pub use crate::shared::types::{
    Balance, ConfirmationOutcome, ConnectOptions, Network, PaymentRequest, PreparedTransaction,
    TokenDescriptor, TokenInfo, TransactionResult, WalletAccount,
};

/// Initialize logging. Safe to call more than once.
pub fn init() {
    let _ = env_logger::try_init();
    log::info!("Payment core initialized");
}

/// Build a processor from the environment: `.env` is loaded when present,
/// configuration comes from the `SOLPAY_*` variables, and the signing
/// keypair from the file at `SOLPAY_KEYPAIR_PATH`.
pub fn init_payment_core() -> Result<PaymentProcessor, PaymentError> {
    dotenv::dotenv().ok();
    init();

    let config = ProcessorConfig::from_env()?;
    let keypair_path = env::var("SOLPAY_KEYPAIR_PATH")
        .map_err(|_| PaymentError::config("SOLPAY_KEYPAIR_PATH is not set"))?;
    let keypair = read_keypair_file(&keypair_path).map_err(|e| {
        PaymentError::config(format!("Cannot read keypair at {}: {}", keypair_path, e))
    })?;

    let ledger: Arc<dyn LedgerRpc> = Arc::new(SolanaLedger::new(&config));
    let wallet = Arc::new(KeypairWallet::new(Arc::new(keypair), ledger.clone()));
    PaymentProcessor::new(
        config,
        ledger,
        wallet,
        Arc::new(TokenRegistry::with_defaults()),
    )
}

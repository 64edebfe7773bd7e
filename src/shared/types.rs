//! Core data model for payment processing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::fmt;
use std::str::FromStr;

use crate::shared::constants;
use crate::shared::error::PaymentError;
use crate::shared::utils;

/// Solana cluster the processor talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Explorer link for a transaction signature. Non-default clusters get a
    /// cluster qualifier so the link resolves on the right network.
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        match self {
            Network::MainnetBeta => format!("{}/{}", constants::EXPLORER_TX_BASE, signature),
            cluster => format!(
                "{}/{}?cluster={}",
                constants::EXPLORER_TX_BASE,
                signature,
                cluster.name()
            ),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::MainnetBeta
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(PaymentError::config(format!("Unknown network: {}", other))),
        }
    }
}

/// Transfer metadata for a registered token.
///
/// `is_native` holds exactly when `mint_address` is absent; the registry
/// enforces this on registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub mint_address: Option<Pubkey>,
    pub decimals: u8,
    pub max_transfer_amount: f64,
    pub logo_url: Option<String>,
    pub is_native: bool,
}

impl TokenInfo {
    /// Default entry for the native coin.
    pub fn native() -> Self {
        Self {
            symbol: constants::NATIVE_SYMBOL.to_string(),
            name: constants::NATIVE_NAME.to_string(),
            mint_address: None,
            decimals: constants::NATIVE_DECIMALS,
            max_transfer_amount: constants::NATIVE_MAX_TRANSFER,
            logo_url: None,
            is_native: true,
        }
    }

    /// Convert a human-readable amount into integer base units, flooring so
    /// the payer is never debited more than authorized.
    pub fn base_units(&self, amount: f64) -> u64 {
        utils::to_base_units(amount, self.decimals)
    }
}

/// Registration input for the token registry. Unspecified fields receive
/// registry defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub name: Option<String>,
    pub mint_address: Option<String>,
    pub decimals: Option<u8>,
    pub max_transfer_amount: Option<f64>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub is_native: bool,
}

/// A single payment to be sent. Constructed per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: f64,
    pub token: String,
    pub memo: Option<String>,
}

/// An unsigned transaction ready to be handed to a wallet signer.
///
/// Immutable once built: the attached blockhash expires at
/// `last_valid_block_height`, after which the transaction must be rebuilt,
/// never patched.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    pub instructions: Vec<Instruction>,
    pub recent_blockhash: Hash,
    pub last_valid_block_height: u64,
    pub fee_payer: Pubkey,
}

impl PreparedTransaction {
    pub fn new(
        instructions: Vec<Instruction>,
        recent_blockhash: Hash,
        last_valid_block_height: u64,
        fee_payer: Pubkey,
    ) -> Self {
        Self {
            instructions,
            recent_blockhash,
            last_valid_block_height,
            fee_payer,
        }
    }

    /// Compile into an unsigned wire transaction.
    pub fn to_transaction(&self) -> Transaction {
        let message = Message::new_with_blockhash(
            &self.instructions,
            Some(&self.fee_payer),
            &self.recent_blockhash,
        );
        Transaction::new_unsigned(message)
    }
}

/// Terminal result of one confirmation run. Exactly one variant is produced
/// per run; it is never revisited afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConfirmationOutcome {
    /// Reached the configured confirmation depth, or the cluster's strongest
    /// finality marker.
    Confirmed {
        signature: String,
        confirmations: Option<usize>,
        finalized: bool,
    },
    /// Never observed within the attempt budget. Not a failure: the
    /// transaction may still land, so the signature is handed back for an
    /// out-of-band check.
    Pending { signature: String },
    /// The cluster reported an execution error. Authoritative and final.
    Failed { signature: String, error: String },
    /// The wall-clock deadline elapsed before any other outcome.
    TimedOut { signature: String },
}

impl ConfirmationOutcome {
    pub fn signature(&self) -> &str {
        match self {
            ConfirmationOutcome::Confirmed { signature, .. }
            | ConfirmationOutcome::Pending { signature }
            | ConfirmationOutcome::Failed { signature, .. }
            | ConfirmationOutcome::TimedOut { signature } => signature,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationOutcome::Confirmed { .. })
    }

    /// Whether the transaction may still land on chain. The caller should
    /// refresh balances later rather than treat the payment as lost.
    pub fn may_still_land(&self) -> bool {
        matches!(
            self,
            ConfirmationOutcome::Pending { .. } | ConfirmationOutcome::TimedOut { .. }
        )
    }
}

/// Outcome of one `send_payment` call, handed to whatever UI layer wraps
/// the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub signature: String,
    pub outcome: ConfirmationOutcome,
    pub explorer_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Balance of one token for the connected wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Balance {
    pub amount: f64,
    pub symbol: String,
}

/// The account a wallet signer connected as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletAccount {
    pub public_key: Pubkey,
}

/// Options forwarded to the wallet signer on connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub only_if_trusted: bool,
    pub force_reapproval: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            only_if_trusted: false,
            force_reapproval: true,
        }
    }
}

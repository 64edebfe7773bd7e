//! Ledger RPC boundary
//!
//! The payment core consumes the ledger through the `LedgerRpc` trait so the
//! builder, confirmation engine, and processor can be exercised against mock
//! endpoints. `SolanaLedger` is the production implementation over a shared
//! nonblocking RPC client, created once and reused for the processor's
//! lifetime.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::TransactionConfirmationStatus;
use spl_associated_token_account::get_associated_token_address;

use crate::infrastructure::config::ProcessorConfig;
use crate::shared::error::PaymentError;

/// Status of a submitted signature as one queried node sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStatus {
    /// Confirmation depth; `None` once the cluster stops counting.
    pub confirmations: Option<usize>,
    /// Whether the cluster reports its strongest finality marker.
    pub finalized: bool,
    /// On-chain execution error, rendered for display.
    pub err: Option<String>,
}

/// Operations the payment core needs from the ledger.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Latest blockhash plus the block height at which it expires.
    async fn latest_blockhash(&self) -> Result<(Hash, u64), PaymentError>;

    /// Whether an account exists at the given address.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, PaymentError>;

    /// Simulate a transaction. Returns the rendered on-chain error when the
    /// transaction would fail, `None` when it would succeed.
    async fn simulate(&self, transaction: &Transaction) -> Result<Option<String>, PaymentError>;

    /// Status of a submitted signature; `None` while the queried node has
    /// not observed it.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, PaymentError>;

    /// Submit a fully signed transaction.
    async fn submit(&self, transaction: &Transaction) -> Result<Signature, PaymentError>;

    /// Native balance of an account, in base units.
    async fn native_balance(&self, address: &Pubkey) -> Result<u64, PaymentError>;

    /// Human-readable token balance of an owner for one mint. Zero when no
    /// holding account exists, rather than an error.
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<f64, PaymentError>;
}

/// Production ledger over a Solana RPC endpoint.
pub struct SolanaLedger {
    client: RpcClient,
}

impl SolanaLedger {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.rpc_url(), config.commitment_config()),
        }
    }

    pub fn with_endpoint(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
        }
    }
}

#[async_trait]
impl LedgerRpc for SolanaLedger {
    async fn latest_blockhash(&self) -> Result<(Hash, u64), PaymentError> {
        self.client
            .get_latest_blockhash_with_commitment(self.client.commitment())
            .await
            .map_err(|e| PaymentError::network(format!("Failed to fetch blockhash: {}", e)))
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, PaymentError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| PaymentError::network(format!("Account lookup failed: {}", e)))?;
        Ok(response.value.is_some())
    }

    async fn simulate(&self, transaction: &Transaction) -> Result<Option<String>, PaymentError> {
        let response = self
            .client
            .simulate_transaction(transaction)
            .await
            .map_err(|e| PaymentError::network(format!("Simulation request failed: {}", e)))?;
        Ok(response.value.err.map(|e| e.to_string()))
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, PaymentError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| PaymentError::network(format!("Status query failed: {}", e)))?;

        let status = response.value.into_iter().next().flatten();
        Ok(status.map(|s| SignatureStatus {
            confirmations: s.confirmations,
            finalized: matches!(
                s.confirmation_status,
                Some(TransactionConfirmationStatus::Finalized)
            ),
            err: s.err.map(|e| e.to_string()),
        }))
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, PaymentError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| PaymentError::network(format!("Transaction submission failed: {}", e)))
    }

    async fn native_balance(&self, address: &Pubkey) -> Result<u64, PaymentError> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| PaymentError::network(format!("Balance query failed: {}", e)))
    }

    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<f64, PaymentError> {
        let holding_account = get_associated_token_address(owner, mint);
        if !self.account_exists(&holding_account).await? {
            return Ok(0.0);
        }
        let balance = self
            .client
            .get_token_account_balance(&holding_account)
            .await
            .map_err(|e| PaymentError::network(format!("Token balance query failed: {}", e)))?;
        Ok(balance.ui_amount.unwrap_or(0.0))
    }
}

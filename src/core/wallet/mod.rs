//! Wallet signing boundary
//!
//! The processor never touches key material directly; it talks to a
//! `WalletSigner`, which owns connect/disconnect state, balance reads, and
//! signing authority. `KeypairWallet` is the local-keypair implementation;
//! browser-extension style signers plug in through the same trait.

use async_trait::async_trait;
use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use std::sync::Arc;

use crate::infrastructure::ledger::LedgerRpc;
use crate::shared::error::PaymentError;
use crate::shared::types::{ConnectOptions, PreparedTransaction, WalletAccount};
use crate::shared::utils;

/// Capability contract every wallet backend fulfills.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Establish a session and report the account it signs for. May fail
    /// with `NotAvailable` when no wallet is reachable or `UserRejected`
    /// when the holder declines the prompt.
    async fn connect(&self, options: &ConnectOptions) -> Result<WalletAccount, PaymentError>;

    /// Tear the session down. Idempotent.
    async fn disconnect(&self) -> Result<(), PaymentError>;

    /// Human-readable balance for `owner`: the native coin when `mint` is
    /// `None`, otherwise the given mint. Zero when no holding account
    /// exists.
    async fn balance(&self, owner: &Pubkey, mint: Option<&Pubkey>) -> Result<f64, PaymentError>;

    /// Sign a prepared transaction and submit it to the ledger.
    async fn sign_and_submit(
        &self,
        prepared: &PreparedTransaction,
    ) -> Result<Signature, PaymentError>;
}

/// Signer backed by a locally held keypair.
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
    ledger: Arc<dyn LedgerRpc>,
}

impl KeypairWallet {
    pub fn new(keypair: Arc<Keypair>, ledger: Arc<dyn LedgerRpc>) -> Self {
        Self { keypair, ledger }
    }

    pub fn public_key(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
    async fn connect(&self, _options: &ConnectOptions) -> Result<WalletAccount, PaymentError> {
        // A local keypair has no approval prompt; connecting just reports
        // the account.
        info!("Connected keypair wallet {}", self.keypair.pubkey());
        Ok(WalletAccount {
            public_key: self.keypair.pubkey(),
        })
    }

    async fn disconnect(&self) -> Result<(), PaymentError> {
        debug!("Disconnected keypair wallet {}", self.keypair.pubkey());
        Ok(())
    }

    async fn balance(&self, owner: &Pubkey, mint: Option<&Pubkey>) -> Result<f64, PaymentError> {
        match mint {
            None => {
                let lamports = self.ledger.native_balance(owner).await?;
                Ok(utils::from_base_units(lamports, 9))
            }
            Some(mint) => self.ledger.token_balance(owner, mint).await,
        }
    }

    async fn sign_and_submit(
        &self,
        prepared: &PreparedTransaction,
    ) -> Result<Signature, PaymentError> {
        let mut transaction = prepared.to_transaction();
        transaction
            .try_sign(&[self.keypair.as_ref()], prepared.recent_blockhash)
            .map_err(|e| PaymentError::signer(format!("Signing failed: {}", e)))?;
        self.ledger.submit(&transaction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::system_instruction;
    use solana_sdk::transaction::Transaction;
    use std::sync::Mutex;

    struct RecordingLedger {
        submitted: Mutex<Vec<Transaction>>,
        lamports: u64,
        token_amount: f64,
    }

    #[async_trait]
    impl LedgerRpc for RecordingLedger {
        async fn latest_blockhash(&self) -> Result<(Hash, u64), PaymentError> {
            Ok((Hash::new_unique(), 1))
        }

        async fn account_exists(&self, _address: &Pubkey) -> Result<bool, PaymentError> {
            Ok(true)
        }

        async fn simulate(&self, _tx: &Transaction) -> Result<Option<String>, PaymentError> {
            Ok(None)
        }

        async fn signature_status(
            &self,
            _signature: &Signature,
        ) -> Result<Option<crate::infrastructure::ledger::SignatureStatus>, PaymentError> {
            Ok(None)
        }

        async fn submit(&self, tx: &Transaction) -> Result<Signature, PaymentError> {
            self.submitted.lock().unwrap().push(tx.clone());
            Ok(tx.signatures[0])
        }

        async fn native_balance(&self, _address: &Pubkey) -> Result<u64, PaymentError> {
            Ok(self.lamports)
        }

        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<f64, PaymentError> {
            Ok(self.token_amount)
        }
    }

    fn wallet(lamports: u64, token_amount: f64) -> (KeypairWallet, Arc<RecordingLedger>) {
        let ledger = Arc::new(RecordingLedger {
            submitted: Mutex::new(Vec::new()),
            lamports,
            token_amount,
        });
        (
            KeypairWallet::new(Arc::new(Keypair::new()), ledger.clone()),
            ledger,
        )
    }

    #[tokio::test]
    async fn test_connect_reports_keypair_account() {
        let (wallet, _) = wallet(0, 0.0);
        let account = wallet.connect(&ConnectOptions::default()).await.unwrap();
        assert_eq!(account.public_key, wallet.public_key());
        assert!(wallet.disconnect().await.is_ok());
    }

    #[tokio::test]
    async fn test_native_balance_scaled_to_sol() {
        let (wallet, _) = wallet(2_500_000_000, 0.0);
        let owner = wallet.public_key();
        let balance = wallet.balance(&owner, None).await.unwrap();
        assert!((balance - 2.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_token_balance_passthrough() {
        let (wallet, _) = wallet(0, 7.25);
        let owner = wallet.public_key();
        let mint = Pubkey::new_unique();
        let balance = wallet.balance(&owner, Some(&mint)).await.unwrap();
        assert!((balance - 7.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_sign_and_submit_produces_signed_transaction() {
        let (wallet, ledger) = wallet(0, 0.0);
        let payer = wallet.public_key();
        let recipient = Pubkey::new_unique();
        let blockhash = Hash::new_unique();
        let prepared = PreparedTransaction::new(
            vec![system_instruction::transfer(&payer, &recipient, 100)],
            blockhash,
            42,
            payer,
        );

        let signature = wallet.sign_and_submit(&prepared).await.unwrap();

        let submitted = ledger.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].signatures[0], signature);
        assert!(submitted[0].verify().is_ok());
    }

    #[tokio::test]
    async fn test_signing_rejects_foreign_fee_payer() {
        let (wallet, _) = wallet(0, 0.0);
        let foreign_payer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let prepared = PreparedTransaction::new(
            vec![system_instruction::transfer(&foreign_payer, &recipient, 100)],
            Hash::new_unique(),
            42,
            foreign_payer,
        );

        let err = wallet.sign_and_submit(&prepared).await.unwrap_err();
        assert!(matches!(err, PaymentError::Signer(_)));
    }
}

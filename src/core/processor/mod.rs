//! Payment processor
//!
//! Orchestrates one payment end to end: wallet session, local validation,
//! transaction construction, pre-flight simulation, signing, submission, and
//! confirmation tracking. The processor owns no key material and no RPC
//! sockets itself; those live behind the `WalletSigner` and `LedgerRpc`
//! boundaries.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::confirmation::ConfirmationEngine;
use crate::core::tokens::TokenRegistry;
use crate::core::transactions::TransactionBuilder;
use crate::core::validation;
use crate::core::wallet::WalletSigner;
use crate::infrastructure::config::ProcessorConfig;
use crate::infrastructure::ledger::LedgerRpc;
use crate::shared::error::PaymentError;
use crate::shared::types::{
    Balance, ConnectOptions, PaymentRequest, TransactionResult, WalletAccount,
};

pub struct PaymentProcessor {
    config: ProcessorConfig,
    registry: Arc<TokenRegistry>,
    ledger: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
    builder: TransactionBuilder,
    confirmation: ConfirmationEngine,
    session: RwLock<Option<WalletAccount>>,
}

impl PaymentProcessor {
    pub fn new(
        config: ProcessorConfig,
        ledger: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSigner>,
        registry: Arc<TokenRegistry>,
    ) -> Result<Self, PaymentError> {
        config.validate()?;
        let builder = TransactionBuilder::new(ledger.clone(), registry.clone());
        let confirmation = ConfirmationEngine::new(ledger.clone(), &config);
        Ok(Self {
            config,
            registry,
            ledger,
            wallet,
            builder,
            confirmation,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// The account the current session signs for, when connected.
    pub async fn connected_account(&self) -> Option<WalletAccount> {
        *self.session.read().await
    }

    /// Open a wallet session. Any previous session is torn down first on a
    /// best-effort basis; a failing disconnect never blocks the reconnect.
    pub async fn connect_wallet(
        &self,
        options: &ConnectOptions,
    ) -> Result<WalletAccount, PaymentError> {
        if self.session.read().await.is_some() {
            if let Err(e) = self.wallet.disconnect().await {
                debug!("Ignoring disconnect failure before reconnect: {}", e);
            }
        }

        let account = self.wallet.connect(options).await?;
        *self.session.write().await = Some(account);
        info!("Wallet session opened for {}", account.public_key);
        Ok(account)
    }

    /// Close the wallet session.
    pub async fn disconnect_wallet(&self) -> Result<(), PaymentError> {
        self.wallet.disconnect().await?;
        *self.session.write().await = None;
        info!("Wallet session closed");
        Ok(())
    }

    /// Balance of the connected wallet for one registered token.
    pub async fn balance(&self, token: &str) -> Result<Balance, PaymentError> {
        let account = self
            .connected_account()
            .await
            .ok_or(PaymentError::NotConnected)?;
        let info = self
            .registry
            .get(token)
            .ok_or_else(|| PaymentError::unknown_token(token.to_string()))?;

        let amount = self
            .wallet
            .balance(&account.public_key, info.mint_address.as_ref())
            .await?;
        Ok(Balance {
            amount,
            symbol: info.symbol,
        })
    }

    /// Send one payment through the full lifecycle.
    ///
    /// Connects implicitly when no session exists. The returned result
    /// carries the confirmation outcome, including `Failed`; an `Err` means
    /// the payment never reached the ledger.
    pub async fn send_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<TransactionResult, PaymentError> {
        let account = match self.connected_account().await {
            Some(account) => account,
            None => self.connect_wallet(&ConnectOptions::default()).await?,
        };

        let token = self.registry.get(&request.token);
        validation::validate_payment(request, token.as_ref())?;

        let prepared = self.builder.build(&account.public_key, request).await?;

        // Pre-flight: a transaction that would fail on chain is rejected
        // before the signer is ever invoked.
        if let Some(error) = self.ledger.simulate(&prepared.to_transaction()).await? {
            warn!("Simulation rejected payment to {}: {}", request.recipient, error);
            return Err(PaymentError::simulation(error));
        }

        let signature = self.wallet.sign_and_submit(&prepared).await?;
        info!(
            "Submitted {} {} to {} as {}",
            request.amount, request.token, request.recipient, signature
        );

        let outcome = self.confirmation.confirm(&signature).await;
        debug!("Payment {} resolved: {:?}", signature, outcome);

        Ok(TransactionResult {
            signature: signature.to_string(),
            explorer_url: self.config.network.explorer_tx_url(&signature.to_string()),
            outcome,
            timestamp: Utc::now(),
        })
    }
}

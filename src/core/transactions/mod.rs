//! Transaction construction
//!
//! Builds unsigned transfer transactions for the native coin and SPL tokens.
//! Every build fetches a fresh blockhash; prepared transactions are handed to
//! the signer as-is and rebuilt, never patched, if they expire.

use log::debug;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::tokens::TokenRegistry;
use crate::infrastructure::ledger::LedgerRpc;
use crate::shared::error::PaymentError;
use crate::shared::types::{PaymentRequest, PreparedTransaction, TokenInfo};

pub struct TransactionBuilder {
    ledger: Arc<dyn LedgerRpc>,
    registry: Arc<TokenRegistry>,
}

impl TransactionBuilder {
    pub fn new(ledger: Arc<dyn LedgerRpc>, registry: Arc<TokenRegistry>) -> Self {
        Self { ledger, registry }
    }

    /// Build an unsigned transfer for `request`, paid and sent by `payer`.
    ///
    /// A request carrying a memo is accepted; the memo is not attached to the
    /// transaction.
    pub async fn build(
        &self,
        payer: &Pubkey,
        request: &PaymentRequest,
    ) -> Result<PreparedTransaction, PaymentError> {
        let token = self
            .registry
            .get(&request.token)
            .ok_or_else(|| PaymentError::unknown_token(request.token.clone()))?;

        let recipient = Pubkey::from_str(&request.recipient)
            .map_err(|_| PaymentError::invalid_recipient(request.recipient.clone()))?;

        let instructions = if token.is_native {
            vec![system_instruction::transfer(
                payer,
                &recipient,
                token.base_units(request.amount),
            )]
        } else {
            self.spl_transfer_instructions(payer, &recipient, &token, request.amount)
                .await?
        };

        let (recent_blockhash, last_valid_block_height) = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(|e| PaymentError::build(format!("Blockhash fetch failed: {}", e)))?;

        debug!(
            "Built {} transfer of {} to {} ({} instruction(s))",
            token.symbol,
            request.amount,
            recipient,
            instructions.len()
        );

        Ok(PreparedTransaction::new(
            instructions,
            recent_blockhash,
            last_valid_block_height,
            *payer,
        ))
    }

    /// SPL transfer, preceded by creation of the recipient's holding account
    /// when it does not exist yet. The payer funds the creation.
    async fn spl_transfer_instructions(
        &self,
        payer: &Pubkey,
        recipient: &Pubkey,
        token: &TokenInfo,
        amount: f64,
    ) -> Result<Vec<solana_sdk::instruction::Instruction>, PaymentError> {
        let mint = token.mint_address.ok_or_else(|| {
            PaymentError::invalid_token(format!("Token {} has no mint address", token.symbol))
        })?;

        let sender_holding = get_associated_token_address(payer, &mint);
        let recipient_holding = get_associated_token_address(recipient, &mint);

        let mut instructions = Vec::with_capacity(2);
        let recipient_funded = self
            .ledger
            .account_exists(&recipient_holding)
            .await
            .map_err(|e| PaymentError::build(format!("Holding account lookup failed: {}", e)))?;
        if !recipient_funded {
            debug!(
                "Recipient {} holds no {} account, adding creation instruction",
                recipient, token.symbol
            );
            instructions.push(create_associated_token_account(
                payer,
                recipient,
                &mint,
                &spl_token::id(),
            ));
        }

        instructions.push(
            spl_token::instruction::transfer(
                &spl_token::id(),
                &sender_holding,
                &recipient_holding,
                payer,
                &[],
                token.base_units(amount),
            )
            .map_err(|e| PaymentError::build(format!("Transfer instruction invalid: {}", e)))?,
        );

        Ok(instructions)
    }
}

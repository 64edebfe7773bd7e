//! Payment request validation
//!
//! Local checks that run before any network traffic. Checks are ordered so
//! the caller always sees the first failure in a stable order: recipient,
//! token, amount, transfer limit.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::shared::error::PaymentError;
use crate::shared::types::{PaymentRequest, TokenInfo};

/// Whether a string parses as a Solana address.
pub fn is_valid_address(address: &str) -> bool {
    Pubkey::from_str(address).is_ok()
}

/// Validate a payment request against the resolved token.
///
/// `token` is the registry lookup result for `request.token`; `None` means
/// the token is unregistered. The limit check is inclusive: an amount equal
/// to the cap passes.
pub fn validate_payment(
    request: &PaymentRequest,
    token: Option<&TokenInfo>,
) -> Result<(), PaymentError> {
    if !is_valid_address(&request.recipient) {
        return Err(PaymentError::invalid_recipient(request.recipient.clone()));
    }

    let token = token.ok_or_else(|| PaymentError::unknown_token(request.token.clone()))?;

    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(PaymentError::invalid_amount(
            "Amount must be a positive number",
        ));
    }

    if request.amount > token.max_transfer_amount {
        return Err(PaymentError::AmountExceedsLimit {
            amount: request.amount,
            limit: token.max_transfer_amount,
            symbol: token.symbol.clone(),
        });
    }

    Ok(())
}

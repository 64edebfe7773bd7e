//! Error handling for the payment core
//!
//! This module defines the error types used throughout the payment core.

use thiserror::Error;

/// Payment error type
#[derive(Error, Debug, Clone)]
pub enum PaymentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {amount} exceeds the {symbol} transfer limit of {limit}")]
    AmountExceedsLimit {
        amount: f64,
        limit: f64,
        symbol: String,
    },

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Transaction build failed: {0}")]
    Build(String),

    #[error("Transaction simulation failed: {0}")]
    Simulation(String),

    #[error("Rejected by user: {0}")]
    UserRejected(String),

    #[error("Wallet not available: {0}")]
    NotAvailable(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid recipient error
    pub fn invalid_recipient(message: impl Into<String>) -> Self {
        Self::InvalidRecipient(message.into())
    }

    /// Create an unknown token error
    pub fn unknown_token(message: impl Into<String>) -> Self {
        Self::UnknownToken(message.into())
    }

    /// Create an invalid amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }

    /// Create an invalid token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(message.into())
    }

    /// Create a transaction build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a simulation error
    pub fn simulation(message: impl Into<String>) -> Self {
        Self::Simulation(message.into())
    }

    /// Create a user rejection error
    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::UserRejected(message.into())
    }

    /// Create a wallet-not-available error
    pub fn not_available(message: impl Into<String>) -> Self {
        Self::NotAvailable(message.into())
    }

    /// Create a signer error
    pub fn signer(message: impl Into<String>) -> Self {
        Self::Signer(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from the user declining a wallet prompt.
    /// Callers use this to offer a retry instead of a hard failure.
    pub fn is_user_rejected(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }

    /// Whether the error is a local validation failure that never touched
    /// the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecipient(_)
                | Self::UnknownToken(_)
                | Self::InvalidAmount(_)
                | Self::AmountExceedsLimit { .. }
                | Self::InvalidToken(_)
        )
    }
}

// Standard library error conversions
impl From<std::io::Error> for PaymentError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for PaymentError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_error_creation() {
        let config_error = PaymentError::config("Missing endpoint");
        let build_error = PaymentError::build("Blockhash fetch failed");
        let validation_error = PaymentError::invalid_amount("Must be positive");

        assert!(matches!(config_error, PaymentError::Config(_)));
        assert!(matches!(build_error, PaymentError::Build(_)));
        assert!(matches!(validation_error, PaymentError::InvalidAmount(_)));
    }

    #[test]
    fn test_error_display() {
        let error = PaymentError::simulation("insufficient funds");
        let display = format!("{}", error);

        assert!(display.contains("Transaction simulation failed"));
        assert!(display.contains("insufficient funds"));
    }

    #[test]
    fn test_user_rejected_classification() {
        assert!(PaymentError::user_rejected("declined in wallet").is_user_rejected());
        assert!(!PaymentError::signer("keypair unusable").is_user_rejected());
    }

    #[test]
    fn test_validation_classification() {
        assert!(PaymentError::unknown_token("USDC").is_validation());
        assert!(PaymentError::AmountExceedsLimit {
            amount: 150.0,
            limit: 100.0,
            symbol: "SOL".to_string(),
        }
        .is_validation());
        assert!(!PaymentError::network("rpc down").is_validation());
    }
}

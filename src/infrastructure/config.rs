//! Processor configuration
//!
//! All confirmation and RPC constants are configuration, not hard-coded
//! values; `from_env` layers environment overrides onto the defaults.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::time::Duration;

use crate::shared::constants;
use crate::shared::error::PaymentError;
use crate::shared::types::Network;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Cluster the processor operates on.
    pub network: Network,
    /// RPC endpoint override; the cluster's public endpoint when unset.
    pub rpc_endpoint: Option<String>,
    /// Commitment for RPC queries: "processed", "confirmed", or "finalized".
    pub commitment: String,
    /// Confirmation depth at which a transaction counts as confirmed.
    pub confirmation_depth: usize,
    /// Delay between signature status polls.
    pub poll_interval_ms: u64,
    /// Status polls allowed before an unseen transaction resolves Pending.
    pub max_attempts: u32,
    /// Hard wall-clock bound on one confirmation run.
    pub timeout_ms: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_endpoint: None,
            commitment: constants::DEFAULT_COMMITMENT.to_string(),
            confirmation_depth: constants::DEFAULT_CONFIRMATION_DEPTH,
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            timeout_ms: constants::DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProcessorConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized keys: `SOLPAY_NETWORK`, `SOLPAY_RPC_ENDPOINT`,
    /// `SOLPAY_COMMITMENT`, `SOLPAY_CONFIRMATION_DEPTH`,
    /// `SOLPAY_POLL_INTERVAL_MS`, `SOLPAY_MAX_ATTEMPTS`, `SOLPAY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, PaymentError> {
        let mut config = Self::default();

        if let Ok(network) = env::var("SOLPAY_NETWORK") {
            config.network = network.parse()?;
        }
        if let Ok(endpoint) = env::var("SOLPAY_RPC_ENDPOINT") {
            if !endpoint.is_empty() {
                config.rpc_endpoint = Some(endpoint);
            }
        }
        if let Ok(commitment) = env::var("SOLPAY_COMMITMENT") {
            config.commitment = commitment;
        }
        if let Ok(depth) = env::var("SOLPAY_CONFIRMATION_DEPTH") {
            config.confirmation_depth = depth
                .parse()
                .map_err(|_| PaymentError::config("SOLPAY_CONFIRMATION_DEPTH must be a number"))?;
        }
        if let Ok(interval) = env::var("SOLPAY_POLL_INTERVAL_MS") {
            config.poll_interval_ms = interval
                .parse()
                .map_err(|_| PaymentError::config("SOLPAY_POLL_INTERVAL_MS must be a number"))?;
        }
        if let Ok(attempts) = env::var("SOLPAY_MAX_ATTEMPTS") {
            config.max_attempts = attempts
                .parse()
                .map_err(|_| PaymentError::config("SOLPAY_MAX_ATTEMPTS must be a number"))?;
        }
        if let Ok(timeout) = env::var("SOLPAY_TIMEOUT_MS") {
            config.timeout_ms = timeout
                .parse()
                .map_err(|_| PaymentError::config("SOLPAY_TIMEOUT_MS must be a number"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        match self.commitment.as_str() {
            "processed" | "confirmed" | "finalized" => {}
            other => {
                return Err(PaymentError::config(format!(
                    "Unknown commitment level: {}",
                    other
                )))
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(PaymentError::config("poll_interval_ms must be > 0"));
        }
        if self.max_attempts == 0 {
            return Err(PaymentError::config("max_attempts must be > 0"));
        }
        if self.timeout_ms == 0 {
            return Err(PaymentError::config("timeout_ms must be > 0"));
        }
        if let Some(endpoint) = &self.rpc_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(PaymentError::config(format!(
                    "rpc_endpoint must be an HTTP(S) URL: {}",
                    endpoint
                )));
            }
        }
        Ok(())
    }

    /// Endpoint to connect to: the override when present, otherwise the
    /// cluster's public endpoint.
    pub fn rpc_url(&self) -> String {
        self.rpc_endpoint
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

//! Confirmation tracking
//!
//! Polls a submitted signature until it resolves. A run always terminates
//! with exactly one outcome, bounded two ways: an attempt budget for a
//! transaction the cluster has never seen, and a wall-clock deadline over
//! the whole run. The deadline is checked before every query and again when
//! the query returns, so a late result never overrides a timeout.

use log::{debug, info, warn};
use solana_sdk::signature::Signature;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::infrastructure::config::ProcessorConfig;
use crate::infrastructure::ledger::{LedgerRpc, SignatureStatus};
use crate::shared::types::ConfirmationOutcome;

pub struct ConfirmationEngine {
    ledger: Arc<dyn LedgerRpc>,
    confirmation_depth: usize,
    poll_interval: Duration,
    max_attempts: u32,
    timeout: Duration,
}

impl ConfirmationEngine {
    pub fn new(ledger: Arc<dyn LedgerRpc>, config: &ProcessorConfig) -> Self {
        Self {
            ledger,
            confirmation_depth: config.confirmation_depth,
            poll_interval: config.poll_interval(),
            max_attempts: config.max_attempts,
            timeout: config.timeout(),
        }
    }

    /// Track `signature` to a terminal outcome.
    ///
    /// Every inconclusive tick consumes one attempt, whether the status was
    /// absent, still shallow, or the query itself failed transiently: a
    /// transient error carries no evidence about the transaction's fate and
    /// is treated like a not-yet-seen response. Exhausting the attempt
    /// budget resolves `Pending` only while the transaction has never been
    /// observed; an observed transaction polls on until it confirms, fails,
    /// or the deadline ends the run. An on-chain execution error is
    /// authoritative and resolves the run immediately.
    pub async fn confirm(&self, signature: &Signature) -> ConfirmationOutcome {
        let deadline = Instant::now() + self.timeout;
        let mut attempt: u32 = 0;

        loop {
            if Instant::now() >= deadline {
                warn!("Confirmation of {} timed out", signature);
                return ConfirmationOutcome::TimedOut {
                    signature: signature.to_string(),
                };
            }

            let status = self.ledger.signature_status(signature).await;

            // A result that arrives after the deadline is stale; the run
            // already timed out.
            if Instant::now() >= deadline {
                warn!("Confirmation of {} timed out", signature);
                return ConfirmationOutcome::TimedOut {
                    signature: signature.to_string(),
                };
            }

            match status {
                Err(e) => {
                    attempt += 1;
                    debug!("Status query for {} failed, retrying: {}", signature, e);
                }
                Ok(Some(status)) => {
                    if let Some(outcome) = self.resolve(signature, &status) {
                        return outcome;
                    }
                    attempt += 1;
                }
                Ok(None) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        info!(
                            "{} not observed after {} attempts, handing back as pending",
                            signature, attempt
                        );
                        return ConfirmationOutcome::Pending {
                            signature: signature.to_string(),
                        };
                    }
                    debug!(
                        "{} not yet observed (attempt {}/{})",
                        signature, attempt, self.max_attempts
                    );
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.poll_interval.min(remaining)).await;
        }
    }

    /// Terminal outcome for an observed status, or `None` to keep polling.
    fn resolve(
        &self,
        signature: &Signature,
        status: &SignatureStatus,
    ) -> Option<ConfirmationOutcome> {
        if let Some(error) = &status.err {
            info!("{} failed on chain: {}", signature, error);
            return Some(ConfirmationOutcome::Failed {
                signature: signature.to_string(),
                error: error.clone(),
            });
        }

        // `confirmations` of `None` means the cluster stopped counting, which
        // is at least as strong as any configured depth.
        let deep_enough = match status.confirmations {
            None => true,
            Some(depth) => depth >= self.confirmation_depth,
        };
        if status.finalized || deep_enough {
            info!(
                "{} confirmed (depth {:?}, finalized: {})",
                signature, status.confirmations, status.finalized
            );
            return Some(ConfirmationOutcome::Confirmed {
                signature: signature.to_string(),
                confirmations: status.confirmations,
                finalized: status.finalized,
            });
        }

        debug!(
            "{} at depth {:?}, waiting for {}",
            signature, status.confirmations, self.confirmation_depth
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::PaymentError;
    use async_trait::async_trait;
    use solana_sdk::hash::Hash;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::transaction::Transaction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// One scripted reply per poll; the last reply repeats.
    type Reply = Result<Option<SignatureStatus>, PaymentError>;

    struct ScriptedLedger {
        replies: Mutex<Vec<Reply>>,
        polls: AtomicUsize,
    }

    impl ScriptedLedger {
        fn new(mut replies: Vec<Reply>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                polls: AtomicUsize::new(0),
            }
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerRpc for ScriptedLedger {
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
        ) -> Result<Option<SignatureStatus>, PaymentError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop().unwrap()
            } else {
                replies[0].clone()
            }
        }

        async fn submit(&self, _tx: &Transaction) -> Result<Signature, PaymentError> {
            Ok(Signature::default())
        }

        async fn native_balance(&self, _address: &Pubkey) -> Result<u64, PaymentError> {
            Ok(0)
        }

        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<f64, PaymentError> {
            Ok(0.0)
        }
    }

    fn engine(ledger: Arc<ScriptedLedger>, config: &ProcessorConfig) -> ConfirmationEngine {
        ConfirmationEngine::new(ledger, config)
    }

    fn config() -> ProcessorConfig {
        let mut config = ProcessorConfig::default();
        config.poll_interval_ms = 10;
        config.max_attempts = 5;
        config.timeout_ms = 10_000;
        config
    }

    fn seen(confirmations: Option<usize>, finalized: bool) -> Reply {
        Ok(Some(SignatureStatus {
            confirmations,
            finalized,
            err: None,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_at_depth() {
        let ledger = Arc::new(ScriptedLedger::new(vec![seen(Some(32), false)]));
        let outcome = engine(ledger, &config()).confirm(&Signature::default()).await;
        assert!(matches!(
            outcome,
            ConfirmationOutcome::Confirmed {
                confirmations: Some(32),
                finalized: false,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shallow_then_confirmed() {
        let ledger = Arc::new(ScriptedLedger::new(vec![
            seen(Some(3), false),
            seen(Some(17), false),
            seen(None, true),
        ]));
        let outcome = engine(ledger.clone(), &config())
            .confirm(&Signature::default())
            .await;
        assert!(outcome.is_confirmed());
        assert_eq!(ledger.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncounted_depth_is_confirmed() {
        // The cluster stops counting once a signature is rooted deeply
        // enough; that must satisfy any configured depth.
        let ledger = Arc::new(ScriptedLedger::new(vec![seen(None, false)]));
        let outcome = engine(ledger, &config()).confirm(&Signature::default()).await;
        assert!(outcome.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_chain_error_fails_after_one_poll() {
        let ledger = Arc::new(ScriptedLedger::new(vec![Ok(Some(SignatureStatus {
            confirmations: Some(1),
            finalized: false,
            err: Some("custom program error: 0x1".to_string()),
        }))]));
        let outcome = engine(ledger.clone(), &config())
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::Failed { error, .. }
            if error.contains("0x1")));
        assert_eq!(ledger.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unseen_resolves_pending_after_attempt_budget() {
        let ledger = Arc::new(ScriptedLedger::new(vec![Ok(None)]));
        let outcome = engine(ledger.clone(), &config())
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::Pending { .. }));
        assert_eq!(ledger.poll_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_share_the_attempt_budget() {
        // Two hiccups then silence: the hiccups count, so the unseen
        // transaction resolves pending on the fifth poll, not the seventh.
        let ledger = Arc::new(ScriptedLedger::new(vec![
            Err(PaymentError::network("rpc hiccup")),
            Err(PaymentError::network("rpc hiccup")),
            Ok(None),
        ]));
        let outcome = engine(ledger.clone(), &config())
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::Pending { .. }));
        assert_eq!(ledger.poll_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_errors_only_end_at_the_deadline() {
        // Errors never resolve pending on their own; the deadline bounds
        // a run whose queries keep failing.
        let mut config = config();
        config.poll_interval_ms = 1000;
        config.timeout_ms = 3_000;
        config.max_attempts = 2;
        let ledger = Arc::new(ScriptedLedger::new(vec![Err(PaymentError::network(
            "rpc down",
        ))]));
        let outcome = engine(ledger.clone(), &config)
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::TimedOut { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_wins_over_attempt_budget() {
        let mut config = config();
        // Three polls fit before the deadline; the attempt budget would
        // allow five.
        config.poll_interval_ms = 1000;
        config.timeout_ms = 2_500;
        let ledger = Arc::new(ScriptedLedger::new(vec![Ok(None)]));
        let outcome = engine(ledger.clone(), &config)
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::TimedOut { .. }));
        assert!(ledger.poll_count() < 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shallow_transaction_polls_until_timeout() {
        // Seen but never deep enough: the attempt budget does not apply,
        // only the deadline ends the run.
        let mut config = config();
        config.poll_interval_ms = 1000;
        config.timeout_ms = 10_000;
        let ledger = Arc::new(ScriptedLedger::new(vec![seen(Some(2), false)]));
        let outcome = engine(ledger.clone(), &config)
            .confirm(&Signature::default())
            .await;
        assert!(matches!(outcome, ConfirmationOutcome::TimedOut { .. }));
        assert!(ledger.poll_count() > 5);
    }
}

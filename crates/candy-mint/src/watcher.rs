//! Confirmation watcher

use std::sync::Arc;
use std::time::Duration;

use candy_mint_common::{
    Commitment, NetworkClient, Signature, SignatureStatus, TransactionError,
};
use tokio::time::{sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Default interval between two signature status reads
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A submitted transaction awaiting its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Signature being watched
    pub signature: Signature,
    /// When it was handed to the watcher
    pub submitted_at: Instant,
    /// When the watcher gives up
    pub timeout_at: Instant,
}

impl PendingTransaction {
    fn new(signature: Signature, wait: Duration) -> Self {
        let submitted_at = Instant::now();
        Self {
            signature,
            submitted_at,
            timeout_at: submitted_at + wait,
        }
    }
}

/// How a watched transaction resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Reached the requested commitment without error
    Confirmed(SignatureStatus),
    /// Landed with an execution error
    Failed(TransactionError),
    /// Deadline passed, outcome unknown
    TimedOut,
    /// The caller stopped waiting, outcome unknown
    Abandoned,
}

/// Polls signature statuses until a transaction resolves
#[derive(Debug, Clone)]
pub struct ConfirmationWatcher {
    client: Arc<dyn NetworkClient + Send + Sync>,
    poll_interval: Duration,
}

impl ConfirmationWatcher {
    /// Create new [`ConfirmationWatcher`]
    pub fn new(client: Arc<dyn NetworkClient + Send + Sync>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Wait for `signature` to reach `commitment`.
    ///
    /// The transaction is never resubmitted. Errors reading the status are
    /// logged and polling goes on until the deadline. Cancelling `cancel` stops
    /// polling without affecting the transaction itself.
    #[instrument(skip(self, cancel))]
    pub async fn watch(
        &self,
        signature: Signature,
        wait: Duration,
        commitment: Commitment,
        cancel: &CancellationToken,
    ) -> WatchOutcome {
        let pending = PendingTransaction::new(signature, wait);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Stopped watching {}", pending.signature);
                WatchOutcome::Abandoned
            }
            outcome = timeout(wait, self.poll(&pending, commitment)) => {
                match outcome {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(
                            "Transaction {} not confirmed after {:?}",
                            pending.signature,
                            pending.timeout_at - pending.submitted_at
                        );
                        WatchOutcome::TimedOut
                    }
                }
            }
        }
    }

    async fn poll(&self, pending: &PendingTransaction, commitment: Commitment) -> WatchOutcome {
        loop {
            match self.client.get_signature_status(&pending.signature).await {
                Ok(Some(status)) => {
                    if let Some(err) = status.err {
                        tracing::debug!("Transaction {} failed: {}", pending.signature, err);
                        return WatchOutcome::Failed(err);
                    }

                    if status.has_reached(commitment) {
                        tracing::debug!(
                            "Transaction {} reached {} in slot {}",
                            pending.signature,
                            commitment,
                            status.slot
                        );
                        return WatchOutcome::Confirmed(status);
                    }
                }
                Ok(None) => {
                    tracing::trace!("Transaction {} not seen yet", pending.signature);
                }
                Err(err) => {
                    tracing::warn!(
                        "Could not read status of {}: {}",
                        pending.signature,
                        err
                    );
                }
            }

            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use candy_mint_common::{Address, Blockhash, UnsignedTransaction};
    use candy_mint_fake_rpc::{pass_instruction, sign_as, FakeLedger, TransactionKind};

    use super::*;

    const WALLET: Address = Address::new([1; 32]);
    const NETWORK: Address = Address::new([2; 32]);

    async fn submit_pass(ledger: &FakeLedger) -> Signature {
        let transaction = UnsignedTransaction::new(WALLET, vec![pass_instruction(&NETWORK, &WALLET)])
            .with_blockhash(Blockhash("hash".to_string()));
        ledger
            .submit(&sign_as(&WALLET, transaction).unwrap())
            .await
            .unwrap()
    }

    fn watcher(ledger: &FakeLedger) -> ConfirmationWatcher {
        ConfirmationWatcher::new(Arc::new(ledger.clone()), DEFAULT_POLL_INTERVAL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_delay() {
        let ledger = FakeLedger::new();
        ledger.delay_confirmations(Duration::from_secs(3)).await;
        let signature = submit_pass(&ledger).await;

        let started = Instant::now();
        let outcome = watcher(&ledger)
            .watch(
                signature,
                Duration::from_secs(30),
                Commitment::Confirmed,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(outcome, WatchOutcome::Confirmed(_)));
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_on_dropped_transaction() {
        let ledger = FakeLedger::new();
        ledger.drop_transactions(TransactionKind::Pass).await;
        let signature = submit_pass(&ledger).await;

        let started = Instant::now();
        let outcome = watcher(&ledger)
            .watch(
                signature,
                Duration::from_secs(30),
                Commitment::Confirmed,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome, WatchOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_read_errors_keep_polling() {
        let ledger = FakeLedger::new();
        let signature = submit_pass(&ledger).await;
        ledger.fail_status_reads(3).await;

        let outcome = watcher(&ledger)
            .watch(
                signature,
                Duration::from_secs(30),
                Commitment::Finalized,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(outcome, WatchOutcome::Confirmed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons() {
        let ledger = FakeLedger::new();
        ledger.drop_transactions(TransactionKind::Pass).await;
        let signature = submit_pass(&ledger).await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(2)).await;
            trigger.cancel();
        });

        let outcome = watcher(&ledger)
            .watch(signature, Duration::from_secs(30), Commitment::Confirmed, &cancel)
            .await;

        assert_eq!(outcome, WatchOutcome::Abandoned);
    }

    #[tokio::test]
    async fn test_reports_execution_error() {
        let ledger = FakeLedger::new();
        // Unknown instruction tag
        let transaction = UnsignedTransaction::new(
            WALLET,
            vec![candy_mint_common::Instruction {
                program_id: candy_mint_fake_rpc::FAKE_PROGRAM_ID,
                accounts: vec![],
                data: vec![0xFF],
            }],
        )
        .with_blockhash(Blockhash("hash".to_string()));
        let signature = ledger
            .submit(&sign_as(&WALLET, transaction).unwrap())
            .await
            .unwrap();

        let outcome = watcher(&ledger)
            .watch(
                signature,
                Duration::from_secs(30),
                Commitment::Confirmed,
                &CancellationToken::new(),
            )
            .await;

        match outcome {
            WatchOutcome::Failed(err) => assert_eq!(err.code, None),
            outcome => panic!("unexpected outcome {:?}", outcome),
        }
    }
}

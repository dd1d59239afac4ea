//! Mint orchestrator
//!
//! Drives one attempt from "user clicked mint" to a settled outcome:
//!
//! 1. check eligibility of the snapshot captured at the start of the attempt
//! 2. plan the split; when needed sign, submit and confirm the setup transaction
//! 3. acquire a gating pass when the program is gated and the wallet has none
//! 4. sign, submit and confirm the mint transaction
//! 5. verify the metadata account exists, then settle
//!
//! At most one attempt runs at a time. Every failure is caught at the attempt
//! boundary and turned into a single alert and `Settled(Failure)`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use candy_mint_common::clock::ledger_now;
use candy_mint_common::{
    Address, Commitment, GatingPassIssuer, MintProgram, NetworkClient, SetupState, Signature,
    UnsignedTransaction, WalletSigner,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

mod alert;
mod classify;
mod gating;
mod state;

pub use alert::{messages, AlertState, Severity, DEFAULT_HIDE_AFTER};
pub use classify::{classify_error, classify_transaction_error};
pub use state::{MintFailure, MintOutcome, MintReceipt, MintState};

use crate::config::SessionConfig;
use crate::eligibility::evaluate;
use crate::fetcher::RefreshedState;
use crate::planner::{SetupStep, TransactionPlanner};
use crate::view::Shared;
use crate::watcher::{ConfirmationWatcher, WatchOutcome};

/// Result of [`MintOrchestrator::attempt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintAttempt {
    /// Another attempt is running, nothing was done
    AlreadyInFlight,
    /// The attempt finished
    Settled {
        /// Outcome
        outcome: MintOutcome,
        /// Commitment of the follow-up refresh
        refresh: Commitment,
    },
}

/// Clears the in-flight flag when the attempt ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Who signs a transaction
#[derive(Clone, Copy)]
enum SignWith<'a> {
    Wallet,
    Issuer(&'a (dyn GatingPassIssuer + Send + Sync)),
}

/// The mint state machine
#[derive(Debug)]
pub struct MintOrchestrator {
    wallet: Address,
    config: SessionConfig,
    client: Arc<dyn NetworkClient + Send + Sync>,
    signer: Arc<dyn WalletSigner + Send + Sync>,
    program: Arc<dyn MintProgram + Send + Sync>,
    gating: Option<Arc<dyn GatingPassIssuer + Send + Sync>>,
    planner: TransactionPlanner,
    watcher: ConfirmationWatcher,
    shared: Arc<Shared>,
    minting: AtomicBool,
    setup: Mutex<Option<SetupState>>,
    cancel: CancellationToken,
}

impl MintOrchestrator {
    pub(crate) fn new(
        config: SessionConfig,
        client: Arc<dyn NetworkClient + Send + Sync>,
        signer: Arc<dyn WalletSigner + Send + Sync>,
        program: Arc<dyn MintProgram + Send + Sync>,
        gating: Option<Arc<dyn GatingPassIssuer + Send + Sync>>,
        shared: Arc<Shared>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            wallet: signer.address(),
            planner: TransactionPlanner::new(program.clone()),
            watcher: ConfirmationWatcher::new(client.clone(), config.poll_interval),
            config,
            client,
            signer,
            program,
            gating,
            shared,
            minting: AtomicBool::new(false),
            setup: Mutex::new(None),
            cancel,
        }
    }

    /// An attempt is running
    pub fn is_minting(&self) -> bool {
        self.minting.load(Ordering::Acquire)
    }

    /// Setup kept from an earlier attempt
    pub async fn pending_setup(&self) -> Option<SetupState> {
        self.setup.lock().await.clone()
    }

    /// Drop any kept setup
    pub async fn reset_setup(&self) {
        if self.setup.lock().await.take().is_some() {
            tracing::debug!("Setup discarded");
        }
    }

    /// Run one attempt against `captured`.
    ///
    /// Returns [`MintAttempt::AlreadyInFlight`] without doing anything when an
    /// attempt is already running.
    #[instrument(skip_all)]
    pub async fn attempt(&self, captured: Option<Arc<RefreshedState>>) -> MintAttempt {
        if self
            .minting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Mint already in flight, ignoring request");
            return MintAttempt::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.minting);

        let outcome = match captured {
            Some(captured) => match self.run(&captured).await {
                Ok(receipt) => {
                    self.shared.apply_minted(&captured.snapshot);
                    MintOutcome::Success(receipt)
                }
                Err(failure) => MintOutcome::Failure(failure),
            },
            None => MintOutcome::Failure(MintFailure::NotReady),
        };

        self.settle(outcome).await
    }

    async fn settle(&self, outcome: MintOutcome) -> MintAttempt {
        let refresh = match &outcome {
            MintOutcome::Success(receipt) => {
                tracing::info!("Minted {} in {}", receipt.mint, receipt.signature);
                self.reset_setup().await;
                self.shared.set_alert(
                    AlertState::success(messages::MINT_SUCCEEDED)
                        .hide_after(Some(alert::SUCCESS_HIDE_AFTER)),
                );
                Commitment::Processed
            }
            MintOutcome::Failure(failure) => {
                tracing::warn!("Mint attempt failed: {}", failure);
                if failure.discards_setup() {
                    self.reset_setup().await;
                }
                if failure.counts_as_failure() {
                    self.shared.record_failure();
                }
                self.shared.set_alert(failure.alert());
                self.config.commitment
            }
        };

        self.shared.set_state(MintState::Settled(outcome.clone()));

        MintAttempt::Settled { outcome, refresh }
    }

    async fn run(&self, captured: &RefreshedState) -> Result<MintReceipt, MintFailure> {
        let snapshot = &captured.snapshot;

        let now = ledger_now();
        let eligibility = evaluate(
            snapshot,
            now,
            captured.balance_sufficient,
            captured.gating_pass_present,
        );
        if !eligibility.can_attempt() {
            return Err(MintFailure::NotEligible(eligibility.reasons));
        }

        let existing = self.setup.lock().await.take();
        let (plan, step) = self
            .planner
            .plan(snapshot, &self.wallet, existing)
            .await
            .map_err(|err| classify_error(&err))?;

        let setup = match step {
            SetupStep::NotNeeded => None,
            SetupStep::Reuse(setup) => Some(setup),
            SetupStep::Build(setup) => {
                tracing::debug!(
                    "Running setup for mint {} ({} bytes estimated)",
                    setup.mint,
                    plan.estimated_size
                );
                self.shared.set_state(MintState::SettingUp);
                self.shared
                    .set_alert(AlertState::info(messages::SIGN_SETUP));

                self.sign_submit_confirm(
                    setup.transaction.clone(),
                    SignWith::Wallet,
                    MintState::AwaitingSetupConfirm,
                )
                .await?;

                self.shared
                    .set_alert(AlertState::info(messages::SETUP_SUCCEEDED));
                Some(setup)
            }
        };

        // Keep the confirmed setup around for a retry until the mint settles
        if let Some(setup) = &setup {
            *self.setup.lock().await = Some(setup.clone());
        }

        if let Some(rule) = &snapshot.gating {
            self.ensure_gating_pass(&rule.network).await?;
        }

        self.shared.set_state(MintState::Minting);
        if setup.is_none() || snapshot.gating.is_some() {
            self.shared.set_alert(AlertState::info(messages::SIGN_MINT));
        }

        let mint = self
            .program
            .mint_transaction(snapshot, &self.wallet, setup.as_ref())
            .await
            .map_err(|err| classify_error(&err))?;

        let signature = self
            .sign_submit_confirm(
                mint.transaction,
                SignWith::Wallet,
                MintState::AwaitingMintConfirm,
            )
            .await?;

        // A confirmed transaction can still have skipped the mint
        match self
            .client
            .read_account(&mint.metadata, Commitment::Processed)
            .await
        {
            Ok(Some(_)) => Ok(MintReceipt {
                signature,
                mint: mint.mint,
                metadata: mint.metadata,
            }),
            Ok(None) => {
                tracing::warn!("Metadata {} missing after {}", mint.metadata, signature);
                Err(MintFailure::LikelyFailed)
            }
            Err(err) => {
                tracing::warn!("Could not read metadata {}: {}", mint.metadata, err);
                Err(MintFailure::LikelyFailed)
            }
        }
    }

    /// Anchor, sign, submit and wait for confirmation
    async fn sign_submit_confirm(
        &self,
        transaction: UnsignedTransaction,
        sign_with: SignWith<'_>,
        awaiting: MintState,
    ) -> Result<Signature, MintFailure> {
        // Nothing is signed once the session is torn down
        if self.cancel.is_cancelled() {
            return Err(MintFailure::Abandoned);
        }

        let blockhash = self
            .client
            .latest_blockhash(self.config.commitment)
            .await
            .map_err(|err| classify_error(&err))?;
        let transaction = transaction.with_blockhash(blockhash);

        let signed = match sign_with {
            SignWith::Wallet => self.signer.sign_transaction(transaction).await,
            SignWith::Issuer(issuer) => issuer.sign_issuance(transaction).await,
        }
        .map_err(|err| classify_error(&err))?;

        let signature = self
            .client
            .submit(&signed)
            .await
            .map_err(|err| classify_error(&err))?;
        tracing::debug!("Submitted {}", signature);

        self.shared.set_state(awaiting);

        match self
            .watcher
            .watch(
                signature,
                self.config.confirmation_timeout,
                self.config.commitment,
                &self.cancel,
            )
            .await
        {
            WatchOutcome::Confirmed(_) => Ok(signature),
            WatchOutcome::Failed(err) => Err(classify_transaction_error(&err)),
            WatchOutcome::TimedOut => Err(MintFailure::TimedOut),
            WatchOutcome::Abandoned => Err(MintFailure::Abandoned),
        }
    }
}

//! Mint session
//!
//! One session per connected wallet. The session owns the orchestrator and a
//! background worker refreshing the mint state every
//! [`SessionConfig::refresh_interval`], independently of any attempt. The
//! presentation layer observes a read-only [`SessionView`] and drives the
//! session through [`MintSession::request_mint`] and
//! [`MintSession::request_refresh`].
//!
//! # Usage
//!
//! ```ignore
//! let session = MintSessionBuilder::new()
//!     .config(SessionConfig::new(machine_id))
//!     .client(HttpClient::new(rpc_url))
//!     .signer(wallet)
//!     .program(program)
//!     .build()?;
//!
//! let attempt = session.request_mint().await;
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use candy_mint_common::{Address, Commitment, Error, MintConfigSnapshot};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use worker::{refresh_once, MessageToWorker};

mod builder;
mod worker;

pub use builder::MintSessionBuilder;

use crate::config::SessionConfig;
use crate::fetcher::StateFetcher;
use crate::orchestrator::{MintAttempt, MintFailure, MintOrchestrator, MintOutcome};
use crate::view::{SessionView, Shared};

/// A wallet's minting session
pub struct MintSession {
    config: SessionConfig,
    wallet: Address,
    shared: Arc<Shared>,
    fetcher: Arc<StateFetcher>,
    orchestrator: MintOrchestrator,
    /// Message sender to background worker
    tx: mpsc::Sender<MessageToWorker>,
    /// Stops confirmation waits on teardown
    cancel: CancellationToken,
    /// Background worker task handle
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Debug for MintSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintSession")
            .field("machine_id", &self.config.machine_id)
            .field("wallet", &self.wallet)
            .field("minting", &self.orchestrator.is_minting())
            .finish()
    }
}

impl Drop for MintSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            tracing::debug!("Dropping MintSession for {}", self.wallet);
            self.cancel.cancel();
            self.tx
                .try_send(MessageToWorker::Stop)
                .inspect_err(|e| {
                    tracing::debug!("Failed to send Stop message for {}: {}", self.wallet, e)
                })
                .ok();
            task.abort();
        }
    }
}

impl MintSession {
    /// Wallet of this session
    pub fn wallet(&self) -> Address {
        self.wallet
    }

    /// Configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.subscribe()
    }

    /// Current view
    pub fn view(&self) -> SessionView {
        self.shared.view()
    }

    /// An attempt is running
    pub fn is_minting(&self) -> bool {
        self.orchestrator.is_minting()
    }

    fn send_message(&self, msg: MessageToWorker) {
        if let Err(e) = self.tx.try_send(msg) {
            tracing::warn!(
                "Failed to send message to refresh task for {} (closed: {}): {}",
                self.wallet,
                self.tx.is_closed(),
                e
            );
        }
    }

    /// Ask the background worker to refresh now (non-blocking)
    pub fn request_refresh(&self, commitment: Commitment) {
        self.send_message(MessageToWorker::Refresh {
            commitment,
            user_initiated: true,
        });
    }

    /// Refresh in the calling task and return the new snapshot
    #[instrument(skip(self))]
    pub async fn refresh(&self, commitment: Commitment) -> Result<Arc<MintConfigSnapshot>, Error> {
        let refreshed = self
            .fetcher
            .refresh(&self.config.machine_id, &self.wallet, commitment)
            .await?;
        let snapshot = Arc::new(refreshed.snapshot.clone());
        self.shared.store_refresh(refreshed);

        Ok(snapshot)
    }

    fn halted_attempt(&self) -> MintAttempt {
        MintAttempt::Settled {
            outcome: MintOutcome::Failure(MintFailure::Configuration(
                self.shared.view().alert.message,
            )),
            refresh: self.config.commitment,
        }
    }

    /// Run a mint attempt.
    ///
    /// A request while an attempt is running returns
    /// [`MintAttempt::AlreadyInFlight`] and has no effect. After
    /// [`MintSession::shutdown`] nothing is signed and the attempt settles as
    /// abandoned. Every finished attempt is followed by a background refresh.
    #[instrument(skip(self))]
    pub async fn request_mint(&self) -> MintAttempt {
        if self.cancel.is_cancelled() {
            tracing::debug!("Session for {} is shut down, ignoring mint request", self.wallet);
            return MintAttempt::Settled {
                outcome: MintOutcome::Failure(MintFailure::Abandoned),
                refresh: self.config.commitment,
            };
        }

        if self.shared.is_halted() {
            return self.halted_attempt();
        }

        if self.orchestrator.is_minting() {
            return MintAttempt::AlreadyInFlight;
        }

        if self.shared.refreshed().is_none() {
            refresh_once(
                &self.fetcher,
                &self.shared,
                &self.config.machine_id,
                &self.wallet,
                self.config.commitment,
                true,
            )
            .await;

            if self.shared.is_halted() {
                return self.halted_attempt();
            }
        }

        let attempt = self.orchestrator.attempt(self.shared.refreshed()).await;

        if let MintAttempt::Settled { refresh, .. } = &attempt {
            self.send_message(MessageToWorker::Refresh {
                commitment: *refresh,
                user_initiated: false,
            });
        }

        attempt
    }

    /// Hide the current alert
    pub fn dismiss_alert(&self) {
        self.shared.dismiss_alert();
    }

    /// Drop a setup kept from an earlier attempt
    pub async fn reset_setup(&self) {
        self.orchestrator.reset_setup().await;
    }

    /// Stop the refresh worker and abandon any confirmation wait.
    ///
    /// A running attempt settles as abandoned; its transaction is not
    /// cancelled.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            if self.tx.send(MessageToWorker::Stop).await.is_err() {
                tracing::debug!("Refresh task for {} already stopped", self.wallet);
            }
            if let Err(err) = task.await {
                tracing::warn!("Refresh task for {} ended abnormally: {}", self.wallet, err);
            }
        }
    }
}

use std::sync::Arc;

use candy_mint_common::worker::spawn_worker;
use candy_mint_common::{
    AllowlistOracle, Error, GatingPassIssuer, MintProgram, NetworkClient, TokenHolderAllowlist,
    WalletSigner,
};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::worker::{self, MessageToWorker};
use super::MintSession;
use crate::config::SessionConfig;
use crate::fetcher::StateFetcher;
use crate::orchestrator::MintOrchestrator;
use crate::view::Shared;

/// Builder for creating a new [`MintSession`]
#[derive(Debug, Default)]
pub struct MintSessionBuilder {
    config: Option<SessionConfig>,
    client: Option<Arc<dyn NetworkClient + Send + Sync>>,
    signer: Option<Arc<dyn WalletSigner + Send + Sync>>,
    program: Option<Arc<dyn MintProgram + Send + Sync>>,
    gating: Option<Arc<dyn GatingPassIssuer + Send + Sync>>,
    allowlist: Option<Arc<dyn AllowlistOracle + Send + Sync>>,
}

impl MintSessionBuilder {
    /// Create a new MintSessionBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the network client
    pub fn client<C: NetworkClient + Send + Sync + 'static>(mut self, client: C) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Set the network client from Arc
    pub fn shared_client(mut self, client: Arc<dyn NetworkClient + Send + Sync>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the wallet signer
    pub fn signer(mut self, signer: Arc<dyn WalletSigner + Send + Sync>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the mint program contract
    pub fn program(mut self, program: Arc<dyn MintProgram + Send + Sync>) -> Self {
        self.program = Some(program);
        self
    }

    /// Set the gating pass issuer, required for gated mints
    pub fn gating_issuer(mut self, gating: Arc<dyn GatingPassIssuer + Send + Sync>) -> Self {
        self.gating = Some(gating);
        self
    }

    /// Set the allowlist oracle.
    ///
    /// Defaults to [`TokenHolderAllowlist`] over the network client.
    pub fn allowlist(mut self, allowlist: Arc<dyn AllowlistOracle + Send + Sync>) -> Self {
        self.allowlist = Some(allowlist);
        self
    }

    /// Build the session and start its refresh worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<MintSession, Error> {
        let config = self
            .config
            .ok_or(Error::Config("Session config required".to_string()))?;
        let client = self
            .client
            .ok_or(Error::Config("Network client required".to_string()))?;
        let signer = self
            .signer
            .ok_or(Error::Config("Wallet signer required".to_string()))?;
        let program = self
            .program
            .ok_or(Error::Config("Mint program required".to_string()))?;
        let allowlist = self
            .allowlist
            .unwrap_or_else(|| Arc::new(TokenHolderAllowlist::new(client.clone())));

        let wallet = signer.address();
        tracing::debug!(
            "Creating MintSession for {} on {}",
            wallet,
            config.machine_id
        );

        let shared = Arc::new(Shared::new());
        let cancel = CancellationToken::new();
        let fetcher = Arc::new(StateFetcher::new(
            client.clone(),
            program.clone(),
            allowlist,
            self.gating.clone(),
        ));
        let orchestrator = MintOrchestrator::new(
            config.clone(),
            client,
            signer,
            program,
            self.gating,
            shared.clone(),
            cancel.clone(),
        );

        let (tx, rx) = mpsc::channel(1_000);

        let task = spawn_worker(worker::refresh_loop(
            fetcher.clone(),
            shared.clone(),
            config.machine_id,
            wallet,
            config.commitment,
            rx,
            config.refresh_interval,
        ));

        // Initial load (best effort - log if it fails)
        if let Err(e) = tx.try_send(MessageToWorker::Refresh {
            commitment: config.commitment,
            user_initiated: false,
        }) {
            tracing::error!("Failed to send initial refresh for {}: {}", wallet, e);
        }

        Ok(MintSession {
            config,
            wallet,
            shared,
            fetcher,
            orchestrator,
            tx,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }
}

//! Session collaborators per backend

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use candy_mint::amount::LAMPORTS_PER_SOL;
use candy_mint::error::Error;
use candy_mint::program::{MintProgram, MintTransaction, SetupState};
use candy_mint::signer::WalletSigner;
use candy_mint::transaction::{SignedTransaction, UnsignedTransaction};
use candy_mint::{Address, HttpClient, MintConfigSnapshot, MintSession, MintSessionBuilder};
use candy_mint_fake_rpc::{sample_machine, FakeLedger, FakePassIssuer, FakeSigner};

use crate::config::{Backend, Settings};

/// Candy Machine v2 program
pub const CANDY_MACHINE_V2_PROGRAM: &str = "cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ";

/// Wallet and program stand-in for reading a drop without signing
#[derive(Debug, Clone, Copy)]
pub struct WatchOnly {
    wallet: Address,
    program_id: Address,
}

impl WatchOnly {
    /// Create new [`WatchOnly`]
    pub fn new(wallet: Address) -> Result<Self, Error> {
        Ok(Self {
            wallet,
            program_id: Address::from_str(CANDY_MACHINE_V2_PROGRAM)?,
        })
    }
}

#[async_trait]
impl WalletSigner for WatchOnly {
    fn address(&self) -> Address {
        self.wallet
    }

    async fn sign_transaction(
        &self,
        _transaction: UnsignedTransaction,
    ) -> Result<SignedTransaction, Error> {
        Err(Error::Signer("Watch-only wallet cannot sign".to_string()))
    }
}

#[async_trait]
impl MintProgram for WatchOnly {
    fn program_id(&self) -> Address {
        self.program_id
    }

    /// Collection seeds are not known here. The program account always
    /// exists, so the transaction size estimate assumes a collection.
    fn collection_address(&self, _machine: &Address) -> Address {
        self.program_id
    }

    fn metadata_address(&self, mint: &Address) -> Address {
        *mint
    }

    async fn setup_transaction(
        &self,
        _snapshot: &MintConfigSnapshot,
        _payer: &Address,
    ) -> Result<SetupState, Error> {
        Err(Error::Config(
            "Minting requires the fake backend".to_string(),
        ))
    }

    async fn mint_transaction(
        &self,
        _snapshot: &MintConfigSnapshot,
        _payer: &Address,
        _setup: Option<&SetupState>,
    ) -> Result<MintTransaction, Error> {
        Err(Error::Config(
            "Minting requires the fake backend".to_string(),
        ))
    }
}

fn random_address() -> Address {
    Address::new(rand::random())
}

/// Start a session for `settings`
pub async fn start_session(settings: &Settings) -> Result<MintSession> {
    settings.validate()?;
    let config = settings.session_config()?;

    match settings.backend {
        Backend::Rpc => {
            let Some(wallet) = settings.wallet()? else {
                bail!("A wallet address is required with the rpc backend");
            };
            let client = HttpClient::new(settings.rpc_url()?);
            let watch_only = Arc::new(WatchOnly::new(wallet)?);

            tracing::info!("Reading {} from {}", config.machine_id, client.url());

            Ok(MintSessionBuilder::new()
                .config(config)
                .client(client)
                .signer(watch_only.clone())
                .program(watch_only)
                .build()?)
        }
        Backend::Fake => {
            let wallet = settings.wallet()?.unwrap_or_else(random_address);
            let ledger = FakeLedger::new();
            ledger
                .create_machine(config.machine_id, &sample_machine(random_address()))
                .await?;
            ledger.fund(wallet, 5 * LAMPORTS_PER_SOL).await;

            tracing::info!(
                "Fake ledger seeded with {} for wallet {}",
                config.machine_id,
                wallet
            );

            Ok(MintSessionBuilder::new()
                .config(config)
                .client(ledger.clone())
                .signer(Arc::new(FakeSigner::new(wallet)))
                .program(Arc::new(ledger.clone()))
                .gating_issuer(Arc::new(FakePassIssuer::new(ledger, random_address())))
                .build()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use candy_mint::{MintAttempt, MintOutcome};

    use super::*;
    use crate::config::Settings;

    const MACHINE: &str = "3xa4EedARJcSaz5Hs3EHz8zcDo8DwMGs3tDRxB7DuzMR";

    #[tokio::test]
    async fn test_rpc_backend_requires_wallet() {
        let settings = Settings {
            program_id: MACHINE.to_string(),
            ..Default::default()
        };

        assert!(start_session(&settings).await.is_err());
    }

    #[tokio::test]
    async fn test_watch_only_cannot_sign() {
        let watch_only = WatchOnly::new(random_address()).unwrap();
        let transaction = UnsignedTransaction::new(watch_only.address(), Vec::new());

        assert!(matches!(
            watch_only.sign_transaction(transaction).await,
            Err(Error::Signer(_))
        ));
    }

    #[tokio::test]
    async fn test_fake_backend_mints() {
        let settings = Settings {
            program_id: MACHINE.to_string(),
            backend: Backend::Fake,
            ..Default::default()
        };

        let session = start_session(&settings).await.unwrap();
        let attempt = session.request_mint().await;

        assert!(matches!(
            attempt,
            MintAttempt::Settled {
                outcome: MintOutcome::Success(_),
                ..
            }
        ));
    }
}

//! State fetcher
//!
//! Reads the mint program account and everything eligibility depends on.
//! Only the program account read itself can fail a refresh: the balance,
//! allowlist and gating pass sub-checks fail closed.

use std::sync::Arc;

use candy_mint_common::layout::CandyMachineAccount;
use candy_mint_common::clock::unix_time;
use candy_mint_common::{
    Address, AllowlistOracle, Amount, Commitment, Error, GatingPassIssuer, MintConfigSnapshot,
    MintProgram, NetworkClient,
};
use tracing::instrument;

/// Result of a successful refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedState {
    /// Program configuration and counters
    pub snapshot: MintConfigSnapshot,
    /// Native balance of the wallet, zero when the read failed
    pub native_balance: Amount,
    /// Wallet can pay the effective price
    pub balance_sufficient: bool,
    /// Wallet holds a valid gating pass
    pub gating_pass_present: bool,
}

/// Reads [`RefreshedState`] from the ledger
#[derive(Debug, Clone)]
pub struct StateFetcher {
    client: Arc<dyn NetworkClient + Send + Sync>,
    program: Arc<dyn MintProgram + Send + Sync>,
    allowlist: Arc<dyn AllowlistOracle + Send + Sync>,
    gating: Option<Arc<dyn GatingPassIssuer + Send + Sync>>,
}

impl StateFetcher {
    /// Create new [`StateFetcher`]
    pub fn new(
        client: Arc<dyn NetworkClient + Send + Sync>,
        program: Arc<dyn MintProgram + Send + Sync>,
        allowlist: Arc<dyn AllowlistOracle + Send + Sync>,
        gating: Option<Arc<dyn GatingPassIssuer + Send + Sync>>,
    ) -> Self {
        Self {
            client,
            program,
            allowlist,
            gating,
        }
    }

    /// Read the program account at `machine_id`, and the state of `wallet`.
    ///
    /// Fails with [`Error::AccountNotFound`] when the account does not exist
    /// and with a transient error when the read itself fails.
    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        machine_id: &Address,
        wallet: &Address,
        commitment: Commitment,
    ) -> Result<RefreshedState, Error> {
        let mut snapshot = self.read_snapshot(machine_id, commitment).await?;

        let (has_collection, native_balance, wallet_allowlisted, gating_pass_present) = tokio::join!(
            self.has_collection(machine_id, commitment),
            self.native_balance(wallet, commitment),
            self.is_allowlisted(&snapshot, wallet, commitment),
            self.has_gating_pass(&snapshot, wallet),
        );

        snapshot.has_collection = has_collection;
        snapshot.wallet_allowlisted = wallet_allowlisted;

        let balance_sufficient = self
            .balance_sufficient(&snapshot, wallet, native_balance, commitment)
            .await;

        tracing::debug!(
            "Refreshed {}: {}/{} redeemed, balance sufficient: {}",
            machine_id,
            snapshot.items_redeemed,
            snapshot.total_supply,
            balance_sufficient
        );

        Ok(RefreshedState {
            snapshot,
            native_balance: native_balance.unwrap_or(Amount::ZERO),
            balance_sufficient,
            gating_pass_present,
        })
    }

    async fn read_snapshot(
        &self,
        machine_id: &Address,
        commitment: Commitment,
    ) -> Result<MintConfigSnapshot, Error> {
        let account = self
            .client
            .read_account(machine_id, commitment)
            .await?
            .ok_or(Error::AccountNotFound(*machine_id))?;

        let expected = self.program.program_id();
        if account.owner != expected {
            return Err(Error::WrongOwner {
                address: *machine_id,
                owner: account.owner,
                expected,
            });
        }

        let decoded = CandyMachineAccount::decode(&account.data)?;

        Ok(MintConfigSnapshot::from_account(
            *machine_id,
            &decoded,
            commitment,
            unix_time(),
        ))
    }

    /// A failed read counts as present, which only makes the split more likely
    async fn has_collection(&self, machine_id: &Address, commitment: Commitment) -> bool {
        let collection = self.program.collection_address(machine_id);
        match self.client.read_account(&collection, commitment).await {
            Ok(account) => account.is_some(),
            Err(err) => {
                tracing::warn!("Could not read collection account {}: {}", collection, err);
                true
            }
        }
    }

    async fn native_balance(&self, wallet: &Address, commitment: Commitment) -> Option<Amount> {
        self.client
            .get_balance(wallet, commitment)
            .await
            .inspect_err(|err| tracing::warn!("Could not read balance of {}: {}", wallet, err))
            .ok()
    }

    async fn is_allowlisted(
        &self,
        snapshot: &MintConfigSnapshot,
        wallet: &Address,
        commitment: Commitment,
    ) -> bool {
        let Some(rule) = &snapshot.allowlist else {
            return false;
        };

        self.allowlist
            .is_allowlisted(rule, wallet, commitment)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("Could not check allowlist for {}: {}", wallet, err);
                false
            })
    }

    async fn has_gating_pass(&self, snapshot: &MintConfigSnapshot, wallet: &Address) -> bool {
        let (Some(rule), Some(gating)) = (&snapshot.gating, &self.gating) else {
            return false;
        };

        gating
            .has_valid_pass(&rule.network, wallet)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("Could not check gating pass for {}: {}", wallet, err);
                false
            })
    }

    async fn balance_sufficient(
        &self,
        snapshot: &MintConfigSnapshot,
        wallet: &Address,
        native_balance: Option<Amount>,
        commitment: Commitment,
    ) -> bool {
        let price = snapshot.effective_price();

        match snapshot.token_mint {
            Some(token_mint) => match self
                .client
                .get_token_balance(wallet, &token_mint, commitment)
                .await
            {
                Ok(held) => Amount::from(held) >= price,
                Err(err) => {
                    tracing::warn!(
                        "Could not read {} token balance of {}: {}",
                        token_mint,
                        wallet,
                        err
                    );
                    false
                }
            },
            None => native_balance.is_some_and(|balance| balance >= price),
        }
    }
}

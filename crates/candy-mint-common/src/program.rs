//! Mint program contract
//!
//! Address derivation and instruction encoding belong to the on-chain program.
//! The client only consumes them through [`MintProgram`].

use std::fmt::Debug;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::Error;
use crate::snapshot::{ConfigFingerprint, MintConfigSnapshot};
use crate::transaction::UnsignedTransaction;

/// Accounts and transaction prepared by a split mint's setup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    /// Wallet the setup was built for
    pub wallet: Address,
    /// Configuration the setup was built for
    pub fingerprint: ConfigFingerprint,
    /// New collectible mint
    pub mint: Address,
    /// Token account holding the collectible
    pub token_account: Address,
    /// Metadata account of the collectible
    pub metadata: Address,
    /// Transaction creating the accounts, carries no payment
    pub transaction: UnsignedTransaction,
}

impl SetupState {
    /// Whether the setup may be consumed by a mint for `wallet` against `snapshot`
    pub fn is_valid_for(&self, wallet: &Address, snapshot: &MintConfigSnapshot) -> bool {
        self.wallet == *wallet && self.fingerprint == snapshot.fingerprint()
    }
}

/// Paying mint transaction and the accounts it creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintTransaction {
    /// Transaction to sign
    pub transaction: UnsignedTransaction,
    /// Collectible mint
    pub mint: Address,
    /// Metadata account that exists once the mint succeeded
    pub metadata: Address,
}

/// Versioned contract of the on-chain mint program
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MintProgram: Debug {
    /// Program id, the expected owner of program accounts
    fn program_id(&self) -> Address;

    /// Address of the collection link account of a program account
    fn collection_address(&self, machine: &Address) -> Address;

    /// Address of the metadata account of a collectible mint
    fn metadata_address(&self, mint: &Address) -> Address;

    /// Build the setup transaction creating the auxiliary accounts of a mint
    async fn setup_transaction(
        &self,
        snapshot: &MintConfigSnapshot,
        payer: &Address,
    ) -> Result<SetupState, Error>;

    /// Build the paying mint transaction.
    ///
    /// With `setup`, the transaction reuses the accounts the setup created.
    async fn mint_transaction(
        &self,
        snapshot: &MintConfigSnapshot,
        payer: &Address,
        setup: Option<&SetupState>,
    ) -> Result<MintTransaction, Error>;
}

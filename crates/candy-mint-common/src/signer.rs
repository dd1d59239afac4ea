//! Wallet signer contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::Error;
use crate::transaction::{SignedTransaction, UnsignedTransaction};

/// The connected wallet.
///
/// Signing may prompt the user; a declined prompt must be reported as
/// [`Error::UserRejected`].
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletSigner: Debug {
    /// Public address of the wallet
    fn address(&self) -> Address;

    /// Sign one transaction
    async fn sign_transaction(
        &self,
        transaction: UnsignedTransaction,
    ) -> Result<SignedTransaction, Error>;

    /// Sign a batch, in order. Fails as a whole when any signature fails.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<UnsignedTransaction>,
    ) -> Result<Vec<SignedTransaction>, Error> {
        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(self.sign_transaction(transaction).await?);
        }
        Ok(signed)
    }
}

//! Network client contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::address::Address;
use crate::amount::Amount;
use crate::commitment::Commitment;
use crate::error::Error;
use crate::transaction::{Blockhash, Signature, SignatureStatus, SignedTransaction};

/// Account as read from the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Owning program
    pub owner: Address,
    /// Native balance of the account
    pub lamports: Amount,
    /// Raw account data
    pub data: Vec<u8>,
}

/// Reads account state from and submits signed transactions to the ledger.
///
/// Typically represents an RPC node, see `candy_mint::HttpClient`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait NetworkClient: Debug {
    /// Read an account, `None` when it does not exist
    async fn read_account(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> Result<Option<AccountInfo>, Error>;

    /// Native balance of an address
    async fn get_balance(&self, address: &Address, commitment: Commitment)
        -> Result<Amount, Error>;

    /// Balance of `mint` tokens held by `owner`, summed over all its token accounts
    async fn get_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
        commitment: Commitment,
    ) -> Result<u64, Error>;

    /// Submit a signed transaction
    async fn submit(&self, transaction: &SignedTransaction) -> Result<Signature, Error>;

    /// Status of a submitted transaction, `None` while the node has not seen it
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, Error>;

    /// Blockhash to anchor a new transaction to
    async fn latest_blockhash(&self, commitment: Commitment) -> Result<Blockhash, Error>;
}

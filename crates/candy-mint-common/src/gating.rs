//! Gating pass contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::Error;
use crate::transaction::{SignedTransaction, UnsignedTransaction};

/// Whether a pass is issued for the first time or an expired one is refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassRequestKind {
    /// First issuance
    Issue,
    /// Refresh of an existing pass
    Refresh,
}

/// Transaction issuing or refreshing a gating pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassIssuance {
    /// Issue or refresh
    pub kind: PassRequestKind,
    /// Transaction to submit
    pub transaction: UnsignedTransaction,
    /// The wallet must sign, otherwise the issuer signs it
    pub requires_user_signature: bool,
}

/// Third-party gating network
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait GatingPassIssuer: Debug {
    /// Whether `wallet` holds a valid pass for `network`
    async fn has_valid_pass(&self, network: &Address, wallet: &Address) -> Result<bool, Error>;

    /// Transaction issuing or refreshing the pass of `wallet`
    async fn request_pass(&self, network: &Address, wallet: &Address)
        -> Result<PassIssuance, Error>;

    /// Sign an issuance that does not require the wallet signature
    async fn sign_issuance(
        &self,
        transaction: UnsignedTransaction,
    ) -> Result<SignedTransaction, Error>;
}

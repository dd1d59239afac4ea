//! Allowlist membership

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::address::Address;
use crate::commitment::Commitment;
use crate::error::Error;
use crate::network::NetworkClient;
use crate::snapshot::AllowlistRule;

/// Decides whether a wallet is on the allowlist of a mint
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AllowlistOracle: Debug {
    /// Whether `wallet` is allowlisted under `rule`
    async fn is_allowlisted(
        &self,
        rule: &AllowlistRule,
        wallet: &Address,
        commitment: Commitment,
    ) -> Result<bool, Error>;
}

/// Holding at least one allowlist token is membership
#[derive(Debug, Clone)]
pub struct TokenHolderAllowlist {
    client: Arc<dyn NetworkClient + Send + Sync>,
}

impl TokenHolderAllowlist {
    /// Create new [`TokenHolderAllowlist`]
    pub fn new(client: Arc<dyn NetworkClient + Send + Sync>) -> Self {
        Self { client }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AllowlistOracle for TokenHolderAllowlist {
    async fn is_allowlisted(
        &self,
        rule: &AllowlistRule,
        wallet: &Address,
        commitment: Commitment,
    ) -> Result<bool, Error> {
        let held = self
            .client
            .get_token_balance(wallet, &rule.mint, commitment)
            .await?;
        Ok(held > 0)
    }
}

//! Transaction planner
//!
//! A mint with many optional features does not fit in a single transaction.
//! The planner estimates the serialized size of the mint transaction and, when
//! it exceeds the network limit, prepares a setup transaction creating the
//! auxiliary accounts first.

use std::sync::Arc;

use candy_mint_common::transaction::MAX_TRANSACTION_SIZE;
use candy_mint_common::{Address, Error, MintConfigSnapshot, MintProgram, SetupState};
use tracing::instrument;

/// Size of a plain mint transaction
pub const BASE_TRANSACTION_SIZE: usize = 892;
/// Collection verification, when authority is retained and a collection exists
pub const COLLECTION_SIZE: usize = 182;
/// Alternate currency token transfer
pub const TOKEN_MINT_SIZE: usize = 177;
/// Allowlist token account
pub const ALLOWLIST_SIZE: usize = 33;
/// Allowlist token burn, on top of [`ALLOWLIST_SIZE`]
pub const ALLOWLIST_BURN_SIZE: usize = 145;
/// Gating pass account
pub const GATING_SIZE: usize = 33;
/// Gating pass expiry accounts, on top of [`GATING_SIZE`]
pub const GATING_EXPIRE_SIZE: usize = 66;

/// Estimated serialized size of the mint transaction in bytes
pub fn estimate_transaction_size(snapshot: &MintConfigSnapshot) -> usize {
    let mut size = BASE_TRANSACTION_SIZE;

    if snapshot.retain_authority && snapshot.has_collection {
        size += COLLECTION_SIZE;
    }

    if snapshot.token_mint.is_some() {
        size += TOKEN_MINT_SIZE;
    }

    if let Some(rule) = &snapshot.allowlist {
        size += ALLOWLIST_SIZE;
        if rule.burn_on_use {
            size += ALLOWLIST_BURN_SIZE;
        }
    }

    if let Some(rule) = &snapshot.gating {
        size += GATING_SIZE;
        if rule.expire_on_use {
            size += GATING_EXPIRE_SIZE;
        }
    }

    size
}

/// Size estimate and split decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintPlan {
    /// Estimated mint transaction size
    pub estimated_size: usize,
    /// The mint is split into a setup and a mint transaction
    pub needs_split: bool,
}

impl MintPlan {
    /// Plan for a snapshot
    pub fn for_snapshot(snapshot: &MintConfigSnapshot) -> Self {
        let estimated_size = estimate_transaction_size(snapshot);
        Self {
            estimated_size,
            needs_split: estimated_size > MAX_TRANSACTION_SIZE,
        }
    }
}

/// What the attempt has to do before the mint transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    /// The mint fits a single transaction
    NotNeeded,
    /// A previously confirmed setup is still valid
    Reuse(SetupState),
    /// A new setup transaction must be signed and confirmed
    Build(SetupState),
}

/// Builds the setup step of a split mint through the mint program contract
#[derive(Debug, Clone)]
pub struct TransactionPlanner {
    program: Arc<dyn MintProgram + Send + Sync>,
}

impl TransactionPlanner {
    /// Create new [`TransactionPlanner`]
    pub fn new(program: Arc<dyn MintProgram + Send + Sync>) -> Self {
        Self { program }
    }

    /// Decide on the split and prepare the setup step.
    ///
    /// `existing` is reused only when it was built for the same wallet and the
    /// same configuration; otherwise it is dropped.
    #[instrument(skip_all)]
    pub async fn plan(
        &self,
        snapshot: &MintConfigSnapshot,
        wallet: &Address,
        existing: Option<SetupState>,
    ) -> Result<(MintPlan, SetupStep), Error> {
        let plan = MintPlan::for_snapshot(snapshot);

        if !plan.needs_split {
            tracing::debug!(
                "Mint transaction fits in one transaction ({} bytes)",
                plan.estimated_size
            );
            return Ok((plan, SetupStep::NotNeeded));
        }

        if let Some(setup) = existing {
            if setup.is_valid_for(wallet, snapshot) {
                tracing::debug!("Reusing setup for mint {}", setup.mint);
                return Ok((plan, SetupStep::Reuse(setup)));
            }
            tracing::debug!("Discarding setup built for another wallet or configuration");
        }

        tracing::debug!(
            "Mint transaction estimated at {} bytes, splitting",
            plan.estimated_size
        );
        let setup = self.program.setup_transaction(snapshot, wallet).await?;

        Ok((plan, SetupStep::Build(setup)))
    }
}

#[cfg(test)]
mod tests {
    use candy_mint_common::{AllowlistRule, Amount, Commitment, EndCondition, GatingRule};

    use super::*;

    fn snapshot() -> MintConfigSnapshot {
        MintConfigSnapshot {
            address: Address::new([1; 32]),
            authority: Address::new([2; 32]),
            treasury: Address::new([3; 32]),
            symbol: String::new(),
            total_supply: 10,
            items_redeemed: 0,
            go_live: Some(0),
            end_condition: EndCondition::None,
            price: Amount::from(1),
            token_mint: None,
            allowlist: None,
            gating: None,
            retain_authority: false,
            has_collection: false,
            wallet_allowlisted: false,
            commitment: Commitment::Confirmed,
            fetched_at: 0,
        }
    }

    #[test]
    fn test_plain_mint_fits() {
        let plan = MintPlan::for_snapshot(&snapshot());
        assert_eq!(plan.estimated_size, 892);
        assert!(!plan.needs_split);
    }

    #[test]
    fn test_collection_needs_retained_authority() {
        let mut snapshot = snapshot();
        snapshot.has_collection = true;
        assert_eq!(estimate_transaction_size(&snapshot), 892);

        snapshot.retain_authority = true;
        assert_eq!(estimate_transaction_size(&snapshot), 892 + 182);
    }

    #[test]
    fn test_split_when_over_limit() {
        let mut snapshot = snapshot();
        snapshot.retain_authority = true;
        snapshot.has_collection = true;
        snapshot.allowlist = Some(AllowlistRule {
            mint: Address::new([4; 32]),
            burn_on_use: true,
            presale: false,
            discount_price: None,
        });

        // 892 + 182 + 33 + 145
        let plan = MintPlan::for_snapshot(&snapshot);
        assert_eq!(plan.estimated_size, 1252);
        assert!(plan.needs_split);
    }

    #[test]
    fn test_estimate_accumulates_features() {
        let mut snapshot = snapshot();
        snapshot.token_mint = Some(Address::new([5; 32]));
        snapshot.gating = Some(GatingRule {
            network: Address::new([6; 32]),
            expire_on_use: false,
        });
        snapshot.allowlist = Some(AllowlistRule {
            mint: Address::new([4; 32]),
            burn_on_use: false,
            presale: false,
            discount_price: None,
        });

        // 892 + 177 + 33 + 33
        let plan = MintPlan::for_snapshot(&snapshot);
        assert_eq!(plan.estimated_size, 1135);
        assert!(!plan.needs_split);

        snapshot.gating = Some(GatingRule {
            network: Address::new([6; 32]),
            expire_on_use: true,
        });
        // + 66
        assert_eq!(estimate_transaction_size(&snapshot), 1201);
        assert!(!MintPlan::for_snapshot(&snapshot).needs_split);
    }
}

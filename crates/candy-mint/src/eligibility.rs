//! Eligibility
//!
//! Pure evaluation of a [`MintConfigSnapshot`] at a point in time. The result
//! is derived data: it is recomputed from its inputs, never stored or patched.

use std::collections::BTreeSet;
use std::fmt;

use candy_mint_common::MintConfigSnapshot;
use serde::Serialize;

/// Why minting is not active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Go-live not reached, or not scheduled
    NotStarted,
    /// Past the fixed end date
    Ended,
    /// No items remain
    SoldOut,
    /// Wallet cannot pay the price
    InsufficientBalance,
    /// A gating pass is required and the wallet holds none
    GatingPassRequired,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ReasonCode::NotStarted => "not started",
            ReasonCode::Ended => "ended",
            ReasonCode::SoldOut => "sold out",
            ReasonCode::InsufficientBalance => "insufficient balance",
            ReasonCode::GatingPassRequired => "gating pass required",
        };
        f.write_str(reason)
    }
}

/// Outcome of [`evaluate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityResult {
    /// Public minting is open for this wallet
    pub is_active: bool,
    /// Allowlisted presale before go-live
    pub is_presale: bool,
    /// No items remain
    pub is_sold_out: bool,
    /// Wallet balance covers the effective price
    pub has_sufficient_balance: bool,
    /// Reasons minting is not active, empty when it is
    pub reasons: BTreeSet<ReasonCode>,
}

impl EligibilityResult {
    /// Whether the mint button is enabled: public mint, or presale with funds
    pub fn can_mint(&self) -> bool {
        self.is_active || (self.is_presale && self.presale_open(true))
    }

    /// Like [`Self::can_mint`], but a missing gating pass does not block: the
    /// orchestrator acquires one as part of the attempt
    pub fn can_attempt(&self) -> bool {
        let started = !self.reasons.contains(&ReasonCode::NotStarted) || self.is_presale;
        started && self.presale_open(false)
    }

    fn presale_open(&self, require_pass: bool) -> bool {
        !self.is_sold_out
            && self.has_sufficient_balance
            && !self.reasons.contains(&ReasonCode::Ended)
            && !(require_pass && self.reasons.contains(&ReasonCode::GatingPassRequired))
    }
}

/// Evaluate eligibility of the session wallet at unix time `now`.
///
/// Deterministic: the same inputs always give the same result.
pub fn evaluate(
    snapshot: &MintConfigSnapshot,
    now: i64,
    balance_sufficient: bool,
    gating_pass_present: bool,
) -> EligibilityResult {
    let mut reasons = BTreeSet::new();

    let is_sold_out = snapshot.is_sold_out();
    if is_sold_out {
        reasons.insert(ReasonCode::SoldOut);
    }

    let started = snapshot.is_live_at(now);
    if !started {
        reasons.insert(ReasonCode::NotStarted);
    }

    let ended = snapshot.has_ended_at(now);
    if ended {
        reasons.insert(ReasonCode::Ended);
    }

    if !balance_sufficient {
        reasons.insert(ReasonCode::InsufficientBalance);
    }

    let pass_ok = snapshot.gating.is_none() || gating_pass_present;
    if !pass_ok {
        reasons.insert(ReasonCode::GatingPassRequired);
    }

    let is_active = started && !ended && balance_sufficient && !is_sold_out && pass_ok;

    // An unscheduled go-live counts as "in the future"
    let is_presale = !started
        && snapshot.wallet_allowlisted
        && snapshot.allowlist.is_some_and(|rule| rule.presale);

    EligibilityResult {
        is_active,
        is_presale,
        is_sold_out,
        has_sufficient_balance: balance_sufficient,
        reasons,
    }
}

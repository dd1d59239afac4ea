//! Mint configuration snapshot

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::Amount;
use crate::commitment::Commitment;
use crate::layout::{CandyMachineAccount, EndSettingType, WhitelistMintMode};

/// When the mint closes besides running out of items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// Open until sold out
    #[default]
    None,
    /// Closed from this unix timestamp on
    Date(i64),
    /// Closed once this many items are redeemed
    RedeemedCount(u64),
}

/// Allowlist rule: holders of the allowlist token get presale access and
/// optionally a discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowlistRule {
    /// Allowlist token mint
    pub mint: Address,
    /// One token is burned per mint
    pub burn_on_use: bool,
    /// Holders may mint before go-live
    pub presale: bool,
    /// Price for holders
    pub discount_price: Option<Amount>,
}

/// Gating rule: minting requires a pass from a third-party network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GatingRule {
    /// Network issuing passes
    pub network: Address,
    /// The pass is single use
    pub expire_on_use: bool,
}

/// Identity of a mint configuration, ignoring counters.
///
/// Artifacts built for one configuration (like a setup transaction) are only
/// valid while the fingerprint stays the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint {
    address: Address,
    price: Amount,
    token_mint: Option<Address>,
    allowlist: Option<AllowlistRule>,
    gating: Option<GatingRule>,
    retain_authority: bool,
    has_collection: bool,
}

/// Point-in-time read of the mint program configuration and counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfigSnapshot {
    /// Program account address
    pub address: Address,
    /// Update authority
    pub authority: Address,
    /// Treasury receiving the price
    pub treasury: Address,
    /// Collectible symbol
    pub symbol: String,
    /// Total supply
    pub total_supply: u64,
    /// Items minted so far
    pub items_redeemed: u64,
    /// Unix timestamp the mint opens at, `None` when not scheduled
    pub go_live: Option<i64>,
    /// End condition
    pub end_condition: EndCondition,
    /// Unit price
    pub price: Amount,
    /// Alternate currency the price is paid in
    pub token_mint: Option<Address>,
    /// Allowlist rule
    pub allowlist: Option<AllowlistRule>,
    /// Gating rule
    pub gating: Option<GatingRule>,
    /// Authority keeps update rights after the mint
    pub retain_authority: bool,
    /// A collection link account exists for this program account
    pub has_collection: bool,
    /// The session wallet is on the allowlist
    pub wallet_allowlisted: bool,
    /// Commitment the snapshot was read at
    pub commitment: Commitment,
    /// Unix time of the read
    pub fetched_at: u64,
}

impl MintConfigSnapshot {
    /// Build a snapshot from a decoded account.
    ///
    /// `has_collection` and `wallet_allowlisted` come from separate reads and
    /// default to `false` here.
    pub fn from_account(
        address: Address,
        account: &CandyMachineAccount,
        commitment: Commitment,
        fetched_at: u64,
    ) -> Self {
        let data = &account.data;

        let end_condition = match data.end_settings {
            None => EndCondition::None,
            Some(settings) => match settings.end_setting_type {
                EndSettingType::Date => {
                    EndCondition::Date(i64::try_from(settings.number).unwrap_or(i64::MAX))
                }
                EndSettingType::Amount => EndCondition::RedeemedCount(settings.number),
            },
        };

        let allowlist = data.whitelist_mint_settings.map(|settings| AllowlistRule {
            mint: settings.mint,
            burn_on_use: settings.mode == WhitelistMintMode::BurnEveryTime,
            presale: settings.presale,
            discount_price: settings.discount_price.map(Amount::from),
        });

        let gating = data.gatekeeper.map(|config| GatingRule {
            network: config.gatekeeper_network,
            expire_on_use: config.expire_on_use,
        });

        Self {
            address,
            authority: account.authority,
            treasury: account.wallet,
            symbol: data.symbol.trim_end_matches('\0').to_string(),
            total_supply: data.items_available,
            items_redeemed: account.items_redeemed,
            go_live: data.go_live_date,
            end_condition,
            price: Amount::from(data.price),
            token_mint: account.token_mint,
            allowlist,
            gating,
            retain_authority: data.retain_authority,
            has_collection: false,
            wallet_allowlisted: false,
            commitment,
            fetched_at,
        }
    }

    /// Items left, `total_supply - items_redeemed`, never negative
    pub fn items_remaining(&self) -> u64 {
        self.total_supply.saturating_sub(self.items_redeemed)
    }

    /// No items remain, or the redeemed-count end condition was reached
    pub fn is_sold_out(&self) -> bool {
        if self.items_remaining() == 0 {
            return true;
        }

        match self.end_condition {
            EndCondition::RedeemedCount(limit) => self.items_redeemed >= limit,
            _ => false,
        }
    }

    /// Go-live reached at `now`
    pub fn is_live_at(&self, now: i64) -> bool {
        self.go_live.is_some_and(|go_live| now >= go_live)
    }

    /// Past a fixed end date at `now`
    pub fn has_ended_at(&self, now: i64) -> bool {
        matches!(self.end_condition, EndCondition::Date(end) if now >= end)
    }

    /// Price the session wallet pays, the allowlist discount when it applies
    pub fn effective_price(&self) -> Amount {
        match &self.allowlist {
            Some(rule) if self.wallet_allowlisted => rule.discount_price.unwrap_or(self.price),
            _ => self.price,
        }
    }

    /// Configuration identity, see [`ConfigFingerprint`]
    pub fn fingerprint(&self) -> ConfigFingerprint {
        ConfigFingerprint {
            address: self.address,
            price: self.price,
            token_mint: self.token_mint,
            allowlist: self.allowlist,
            gating: self.gating,
            retain_authority: self.retain_authority,
            has_collection: self.has_collection,
        }
    }

    /// Copy of the snapshot with `count` more items redeemed, capped at the
    /// total supply
    pub fn with_redeemed(&self, count: u64) -> Self {
        let mut next = self.clone();
        next.items_redeemed = self
            .items_redeemed
            .saturating_add(count)
            .min(self.total_supply);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CandyMachineData, EndSettings, WhitelistMintSettings};

    fn account(items_available: u64, items_redeemed: u64) -> CandyMachineAccount {
        CandyMachineAccount {
            authority: Address::new([1; 32]),
            wallet: Address::new([2; 32]),
            token_mint: None,
            items_redeemed,
            data: CandyMachineData {
                uuid: "ABCDEF".to_string(),
                price: 100,
                symbol: "RUGZ\0\0".to_string(),
                seller_fee_basis_points: 0,
                max_supply: 0,
                is_mutable: true,
                retain_authority: true,
                go_live_date: Some(1_000),
                end_settings: None,
                creators: vec![],
                hidden_settings: None,
                whitelist_mint_settings: None,
                items_available,
                gatekeeper: None,
            },
        }
    }

    fn snapshot(items_available: u64, items_redeemed: u64) -> MintConfigSnapshot {
        MintConfigSnapshot::from_account(
            Address::new([9; 32]),
            &account(items_available, items_redeemed),
            Commitment::Confirmed,
            0,
        )
    }

    #[test]
    fn test_remaining_is_derived() {
        let snapshot = snapshot(3333, 1000);
        assert_eq!(snapshot.items_remaining(), 2333);
        assert_eq!(snapshot.symbol, "RUGZ");
    }

    #[test]
    fn test_remaining_never_negative() {
        let snapshot = snapshot(10, 12);
        assert_eq!(snapshot.items_remaining(), 0);
        assert!(snapshot.is_sold_out());
    }

    #[test]
    fn test_redeemed_count_end_condition() {
        let mut snapshot = snapshot(100, 50);
        snapshot.end_condition = EndCondition::RedeemedCount(50);
        assert!(snapshot.is_sold_out());
        snapshot.end_condition = EndCondition::RedeemedCount(51);
        assert!(!snapshot.is_sold_out());
    }

    #[test]
    fn test_end_settings_mapping() {
        let mut account = account(100, 0);
        account.data.end_settings = Some(EndSettings {
            end_setting_type: EndSettingType::Date,
            number: 5_000,
        });
        let snapshot =
            MintConfigSnapshot::from_account(Address::default(), &account, Commitment::Processed, 0);
        assert_eq!(snapshot.end_condition, EndCondition::Date(5_000));
        assert!(snapshot.has_ended_at(5_000));
        assert!(!snapshot.has_ended_at(4_999));
    }

    #[test]
    fn test_with_redeemed_is_capped() {
        let snapshot = snapshot(3, 2);
        let next = snapshot.with_redeemed(5);
        assert_eq!(next.items_redeemed, 3);
        assert_eq!(next.items_remaining(), 0);
        assert_eq!(snapshot.items_redeemed, 2);
    }

    #[test]
    fn test_effective_price_uses_discount_for_allowlisted_wallet() {
        let mut account = account(100, 0);
        account.data.whitelist_mint_settings = Some(WhitelistMintSettings {
            mode: WhitelistMintMode::NeverBurn,
            mint: Address::new([5; 32]),
            presale: false,
            discount_price: Some(40),
        });
        let mut snapshot =
            MintConfigSnapshot::from_account(Address::default(), &account, Commitment::Confirmed, 0);
        assert_eq!(snapshot.effective_price(), Amount::from(100));
        snapshot.wallet_allowlisted = true;
        assert_eq!(snapshot.effective_price(), Amount::from(40));
        assert!(!snapshot.allowlist.unwrap().burn_on_use);
    }

    #[test]
    fn test_fingerprint_ignores_counters() {
        let a = snapshot(100, 1);
        let b = snapshot(100, 7);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = snapshot(100, 1);
        c.price = Amount::from(1);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}

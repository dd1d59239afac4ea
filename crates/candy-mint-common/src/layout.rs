//! On-chain account layout of the mint program (Candy Machine v2)
//!
//! The account starts with an 8 byte discriminator followed by the borsh
//! encoded [`CandyMachineAccount`]. Config lines follow the fixed part and are
//! not read by the client.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::address::Address;
use crate::error::Error;

/// Length of the account discriminator prefix
pub const DISCRIMINATOR_LEN: usize = 8;

/// Fixed part of the mint program account
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineAccount {
    /// Update authority
    pub authority: Address,
    /// Treasury receiving the price
    pub wallet: Address,
    /// Alternate currency the price is paid in
    pub token_mint: Option<Address>,
    /// Items minted so far
    pub items_redeemed: u64,
    /// Configuration
    pub data: CandyMachineData,
}

/// Configuration of the mint program account
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineData {
    /// Short id
    pub uuid: String,
    /// Price per item
    pub price: u64,
    /// Collectible symbol
    pub symbol: String,
    /// Royalty basis points
    pub seller_fee_basis_points: u16,
    /// Max editions
    pub max_supply: u64,
    /// Metadata mutability
    pub is_mutable: bool,
    /// Authority keeps update rights after the mint
    pub retain_authority: bool,
    /// Unix timestamp the mint opens at
    pub go_live_date: Option<i64>,
    /// When the mint closes
    pub end_settings: Option<EndSettings>,
    /// Creators
    pub creators: Vec<Creator>,
    /// Hidden settings for reveal-later drops
    pub hidden_settings: Option<HiddenSettings>,
    /// Allowlist token settings
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    /// Total supply
    pub items_available: u64,
    /// Gating network settings
    pub gatekeeper: Option<GatekeeperConfig>,
}

/// End setting type
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum EndSettingType {
    /// `number` is a unix timestamp
    Date,
    /// `number` is a redeemed count
    Amount,
}

/// End settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EndSettings {
    /// Type
    pub end_setting_type: EndSettingType,
    /// Date or count
    pub number: u64,
}

/// Creator
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Creator {
    /// Address
    pub address: Address,
    /// Verified
    pub verified: bool,
    /// Share in percent
    pub share: u8,
}

/// Hidden settings
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct HiddenSettings {
    /// Placeholder name
    pub name: String,
    /// Placeholder uri
    pub uri: String,
    /// Hash of the reveal file
    pub hash: [u8; 32],
}

/// Allowlist token burn mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum WhitelistMintMode {
    /// One allowlist token is burned per mint
    BurnEveryTime,
    /// Holding the token is enough
    NeverBurn,
}

/// Allowlist settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WhitelistMintSettings {
    /// Burn mode
    pub mode: WhitelistMintMode,
    /// Allowlist token mint
    pub mint: Address,
    /// Holders may mint before go-live
    pub presale: bool,
    /// Price for holders
    pub discount_price: Option<u64>,
}

/// Gating network settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GatekeeperConfig {
    /// Network issuing passes
    pub gatekeeper_network: Address,
    /// Pass is consumed by a mint
    pub expire_on_use: bool,
}

impl CandyMachineAccount {
    /// Decode raw account data, discriminator included.
    ///
    /// Trailing bytes (config lines) are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(Error::InvalidAccountData(format!(
                "account data too short: {} bytes",
                data.len()
            )));
        }

        let mut body = &data[DISCRIMINATOR_LEN..];
        CandyMachineAccount::deserialize(&mut body)
            .map_err(|e| Error::InvalidAccountData(e.to_string()))
    }

    /// Encode with the given discriminator prefix
    pub fn encode(&self, discriminator: [u8; DISCRIMINATOR_LEN]) -> Result<Vec<u8>, Error> {
        let mut data = discriminator.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CandyMachineAccount {
        CandyMachineAccount {
            authority: Address::new([1; 32]),
            wallet: Address::new([2; 32]),
            token_mint: None,
            items_redeemed: 12,
            data: CandyMachineData {
                uuid: "AbC123".to_string(),
                price: 1_000_000_000,
                symbol: "RUGZ".to_string(),
                seller_fee_basis_points: 500,
                max_supply: 0,
                is_mutable: true,
                retain_authority: true,
                go_live_date: Some(1_640_000_000),
                end_settings: Some(EndSettings {
                    end_setting_type: EndSettingType::Amount,
                    number: 100,
                }),
                creators: vec![Creator {
                    address: Address::new([3; 32]),
                    verified: true,
                    share: 100,
                }],
                hidden_settings: None,
                whitelist_mint_settings: Some(WhitelistMintSettings {
                    mode: WhitelistMintMode::BurnEveryTime,
                    mint: Address::new([4; 32]),
                    presale: true,
                    discount_price: Some(500_000_000),
                }),
                items_available: 3333,
                gatekeeper: None,
            },
        }
    }

    #[test]
    fn test_decode_ignores_config_lines() {
        let account = sample();
        let mut data = account.encode([9; 8]).unwrap();
        data.extend_from_slice(&[0xAA; 64]);

        assert_eq!(CandyMachineAccount::decode(&data).unwrap(), account);
    }

    #[test]
    fn test_decode_short_data() {
        assert!(matches!(
            CandyMachineAccount::decode(&[0; 4]),
            Err(Error::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_decode_truncated_body() {
        let data = sample().encode([0; 8]).unwrap();
        assert!(CandyMachineAccount::decode(&data[..40]).is_err());
    }
}

//! Amounts
//!
//! Prices and balances are expressed in the smallest unit of their currency:
//! lamports for the native currency, base units for alternate currency tokens.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Lamports in one whole native coin
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Amount in the smallest unit of a currency
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Amount zero
    pub const ZERO: Amount = Amount(0);

    /// Checked addition for Amount. Returns None if overflow occurs.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction for Amount. Returns None if overflow occurs.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Render a native amount as whole coins, e.g. `1.5`
    pub fn to_sol_string(&self) -> String {
        let whole = self.0 / LAMPORTS_PER_SOL;
        let frac = self.0 % LAMPORTS_PER_SOL;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:09}", frac);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(width) = f.width() {
            write!(f, "{:width$}", self.0, width = width)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Amount> for u64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sol_string() {
        assert_eq!(Amount::from(LAMPORTS_PER_SOL).to_sol_string(), "1");
        assert_eq!(Amount::from(1_500_000_000).to_sol_string(), "1.5");
        assert_eq!(Amount::from(10_000_000).to_sol_string(), "0.01");
        assert_eq!(Amount::ZERO.to_sol_string(), "0");
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(Amount::from(1).checked_sub(Amount::from(2)), None);
        assert_eq!(Amount::from(u64::MAX).checked_add(Amount::from(1)), None);
        assert_eq!(
            Amount::from(5).checked_sub(Amount::from(2)),
            Some(Amount::from(3))
        );
    }
}

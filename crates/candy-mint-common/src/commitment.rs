//! Commitment levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How settled ledger state must be before a read or a confirmation is trusted.
///
/// Ordered from least to most settled, so `status >= requested` means the
/// requested level has been reached.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Processed by the connected node, may still be rolled back
    Processed,
    /// Voted on by a supermajority
    #[default]
    Confirmed,
    /// Rooted
    Finalized,
}

impl Commitment {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            // Older nodes still answer with the legacy names
            "confirmed" | "singlegossip" => Ok(Commitment::Confirmed),
            "finalized" | "max" => Ok(Commitment::Finalized),
            _ => Err(format!("Unknown commitment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn test_parse_legacy_names() {
        assert_eq!(
            Commitment::from_str("singleGossip").unwrap(),
            Commitment::Confirmed
        );
        assert_eq!(Commitment::from_str("max").unwrap(), Commitment::Finalized);
        assert!(Commitment::from_str("recent-ish").is_err());
    }
}

//! Errors

use std::fmt;

use thiserror::Error;

use crate::address::{self, Address};

/// Candy Mint Error
#[derive(Debug, Error)]
pub enum Error {
    /// The program account does not exist at the configured address
    #[error("Account does not exist {0}")]
    AccountNotFound(Address),
    /// Account exists but is owned by an unexpected program
    #[error("Account `{address}` is owned by `{owner}`, expected `{expected}`")]
    WrongOwner {
        /// Account address
        address: Address,
        /// Actual owner
        owner: Address,
        /// Expected owner
        expected: Address,
    },
    /// Account data could not be decoded with the program layout
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),
    /// Network read or write failed or timed out
    #[error("Rpc unavailable: {0}")]
    RpcUnavailable(String),
    /// Rpc node answered with an error object
    #[error("Rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
    },
    /// User declined to sign
    #[error("User rejected the signature request")]
    UserRejected,
    /// Signer failed for a reason other than rejection
    #[error("Signer error: {0}")]
    Signer(String),
    /// Transaction was rejected by the mint program
    #[error("Program error: {0}")]
    Program(ProgramErrorCode),
    /// Transaction was rejected without a program error code
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),
    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Gating pass issuance failed
    #[error("Gating pass issuance failed: {0}")]
    PassIssuance(String),
    /// Address Error
    #[error(transparent)]
    Address(#[from] address::Error),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// Borsh decode error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Custom Error
    #[error("`{0}`")]
    Custom(String),
}

impl Error {
    /// Errors that the next scheduled refresh is expected to recover from
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::RpcUnavailable(_) | Error::Rpc { .. } | Error::Timeout
        )
    }

    /// Errors that only an operator can fix by changing configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::AccountNotFound(_)
                | Error::WrongOwner { .. }
                | Error::InvalidAccountData(_)
                | Error::Config(_)
                | Error::Address(_)
        )
    }
}

/// Known program error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramErrorKind {
    /// Not enough funds to pay the price
    InsufficientFunds,
    /// No items remain
    SoldOut,
    /// Go-live date not reached
    NotLive,
    /// Anything else
    Other,
}

/// Custom error code returned by the mint program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramErrorCode(pub u32);

impl ProgramErrorCode {
    /// `0x135`
    pub const NOT_ENOUGH_FUNDS: ProgramErrorCode = ProgramErrorCode(309);
    /// `0x137`
    pub const CANDY_MACHINE_EMPTY: ProgramErrorCode = ProgramErrorCode(311);
    /// `0x138`
    pub const CANDY_MACHINE_NOT_LIVE: ProgramErrorCode = ProgramErrorCode(312);

    /// Classify the code
    pub fn kind(&self) -> ProgramErrorKind {
        match *self {
            Self::NOT_ENOUGH_FUNDS => ProgramErrorKind::InsufficientFunds,
            Self::CANDY_MACHINE_EMPTY => ProgramErrorKind::SoldOut,
            Self::CANDY_MACHINE_NOT_LIVE => ProgramErrorKind::NotLive,
            _ => ProgramErrorKind::Other,
        }
    }

    /// Extract a custom program error code from a node's log or error message,
    /// e.g. `custom program error: 0x137`
    pub fn from_message(message: &str) -> Option<Self> {
        let (_, rest) = message.split_once("custom program error: 0x")?;
        let hex: String = rest
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        u32::from_str_radix(&hex, 16).ok().map(ProgramErrorCode)
    }
}

impl fmt::Display for ProgramErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.0, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_kinds() {
        assert_eq!(
            ProgramErrorCode(0x137).kind(),
            ProgramErrorKind::SoldOut
        );
        assert_eq!(ProgramErrorCode(0x138).kind(), ProgramErrorKind::NotLive);
        assert_eq!(
            ProgramErrorCode(0x135).kind(),
            ProgramErrorKind::InsufficientFunds
        );
        assert_eq!(ProgramErrorCode(6000).kind(), ProgramErrorKind::Other);
    }

    #[test]
    fn test_code_from_message() {
        let message = "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x137";
        assert_eq!(
            ProgramErrorCode::from_message(message),
            Some(ProgramErrorCode::CANDY_MACHINE_EMPTY)
        );
        assert_eq!(ProgramErrorCode::from_message("blockhash not found"), None);
    }

    #[test]
    fn test_error_classes() {
        assert!(Error::RpcUnavailable("down".into()).is_transient());
        assert!(!Error::UserRejected.is_transient());
        assert!(Error::AccountNotFound(Address::default()).is_configuration());
        assert!(!Error::Timeout.is_configuration());
    }
}

//! Fake Ledger Error

use thiserror::Error;

/// Fake Ledger Error
#[derive(Debug, Error)]
pub enum Error {
    /// Wire bytes are not a transaction produced by a fake signer
    #[error("Invalid transaction wire format: {0}")]
    InvalidWire(#[from] serde_json::Error),
    /// Transaction was signed without a recent blockhash
    #[error("Transaction is missing a recent blockhash")]
    MissingBlockhash,
    /// Transaction has no instructions
    #[error("Transaction has no instructions")]
    EmptyTransaction,
    /// Common Error
    #[error(transparent)]
    Common(#[from] candy_mint_common::Error),
}

impl From<Error> for candy_mint_common::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Common(e) => e,
            e => Self::TransactionRejected(e.to_string()),
        }
    }
}

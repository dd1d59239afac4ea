#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod address;
pub mod allowlist;
pub mod amount;
pub mod clock;
pub mod commitment;
pub mod error;
pub mod gating;
pub mod layout;
pub mod network;
pub mod program;
pub mod signer;
pub mod snapshot;
pub mod transaction;
pub mod worker;

pub use address::Address;
pub use allowlist::{AllowlistOracle, TokenHolderAllowlist};
pub use amount::Amount;
pub use commitment::Commitment;
pub use error::{Error, ProgramErrorCode, ProgramErrorKind};
pub use gating::{GatingPassIssuer, PassIssuance, PassRequestKind};
pub use network::{AccountInfo, NetworkClient};
pub use program::{MintProgram, MintTransaction, SetupState};
pub use signer::WalletSigner;
pub use snapshot::{AllowlistRule, EndCondition, GatingRule, MintConfigSnapshot};
pub use transaction::{
    AccountMeta, Blockhash, Instruction, Signature, SignatureStatus, SignedTransaction,
    TransactionError, UnsignedTransaction,
};

//! Mint state machine values

use std::collections::BTreeSet;
use std::fmt;

use candy_mint_common::{Address, ProgramErrorCode, Signature};

use crate::eligibility::ReasonCode;

/// Where the current attempt is.
///
/// `Idle → SettingUp → AwaitingSetupConfirm → AcquiringPass → Minting →
/// AwaitingMintConfirm → Settled`, where the setup and pass states are skipped
/// when not needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintState {
    /// No attempt yet
    #[default]
    Idle,
    /// Building and signing the setup transaction
    SettingUp,
    /// Setup submitted, waiting for confirmation
    AwaitingSetupConfirm,
    /// Issuing or refreshing the gating pass
    AcquiringPass,
    /// Building and signing the mint transaction
    Minting,
    /// Mint submitted, waiting for confirmation
    AwaitingMintConfirm,
    /// Last attempt finished
    Settled(MintOutcome),
}

impl MintState {
    /// An attempt is running
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, MintState::Idle | MintState::Settled(_))
    }
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintState::Idle => write!(f, "idle"),
            MintState::SettingUp => write!(f, "setting up"),
            MintState::AwaitingSetupConfirm => write!(f, "awaiting setup confirmation"),
            MintState::AcquiringPass => write!(f, "acquiring gating pass"),
            MintState::Minting => write!(f, "minting"),
            MintState::AwaitingMintConfirm => write!(f, "awaiting mint confirmation"),
            MintState::Settled(MintOutcome::Success(receipt)) => {
                write!(f, "minted {}", receipt.mint)
            }
            MintState::Settled(MintOutcome::Failure(failure)) => write!(f, "failed: {}", failure),
        }
    }
}

/// Collectible minted by a successful attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    /// Mint transaction signature
    pub signature: Signature,
    /// Collectible mint
    pub mint: Address,
    /// Metadata account
    pub metadata: Address,
}

/// Final outcome of an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintOutcome {
    /// Minted
    Success(MintReceipt),
    /// Not minted, or not known to be minted
    Failure(MintFailure),
}

impl MintOutcome {
    /// Minted
    pub fn is_success(&self) -> bool {
        matches!(self, MintOutcome::Success(_))
    }
}

/// Why an attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintFailure {
    /// The cached state does not allow minting
    NotEligible(BTreeSet<ReasonCode>),
    /// No snapshot has been read yet
    NotReady,
    /// Program reported no items left
    SoldOut,
    /// Program reported go-live not reached
    NotLive,
    /// Program reported insufficient funds
    InsufficientFunds,
    /// Program rejected the transaction with another code
    ProgramRejected(Option<ProgramErrorCode>),
    /// Signature request declined
    UserCancelled,
    /// Confirmation deadline passed
    TimedOut,
    /// Mint confirmed but its metadata account does not exist
    LikelyFailed,
    /// Gating pass transaction never confirmed
    PassDropped,
    /// Gating pass could not be obtained
    PassUnavailable(String),
    /// Network read or submission failed
    Network(String),
    /// Operator configuration problem
    Configuration(String),
    /// Session shut down while waiting for a confirmation
    Abandoned,
}

impl MintFailure {
    /// Counted as a failed attempt. Declined signatures and abandoned waits
    /// are not.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(
            self,
            MintFailure::UserCancelled | MintFailure::Abandoned | MintFailure::NotReady
        )
    }

    /// A setup built for the current configuration can no longer be used
    pub fn discards_setup(&self) -> bool {
        matches!(self, MintFailure::SoldOut)
    }
}

impl fmt::Display for MintFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintFailure::NotEligible(reasons) => {
                let reasons: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                write!(f, "not eligible: {}", reasons.join(", "))
            }
            MintFailure::NotReady => write!(f, "state not loaded"),
            MintFailure::SoldOut => write!(f, "sold out"),
            MintFailure::NotLive => write!(f, "not live"),
            MintFailure::InsufficientFunds => write!(f, "insufficient funds"),
            MintFailure::ProgramRejected(Some(code)) => write!(f, "program error {}", code),
            MintFailure::ProgramRejected(None) => write!(f, "transaction rejected"),
            MintFailure::UserCancelled => write!(f, "user cancelled"),
            MintFailure::TimedOut => write!(f, "timed out"),
            MintFailure::LikelyFailed => write!(f, "metadata missing"),
            MintFailure::PassDropped => write!(f, "pass transaction dropped"),
            MintFailure::PassUnavailable(reason) => write!(f, "gating pass unavailable: {}", reason),
            MintFailure::Network(reason) => write!(f, "network: {}", reason),
            MintFailure::Configuration(reason) => write!(f, "configuration: {}", reason),
            MintFailure::Abandoned => write!(f, "abandoned"),
        }
    }
}

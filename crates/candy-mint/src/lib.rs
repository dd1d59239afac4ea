//! Candy Machine v2 mint client engine
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod config;
pub mod eligibility;
pub mod fetcher;
pub mod orchestrator;
pub mod planner;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod session;
mod view;
pub mod watcher;

/// Re-export common types
#[doc(hidden)]
pub use candy_mint_common::{
    address, amount, commitment,
    error::{self, Error},
    clock, gating, layout, network, program, signer, snapshot, transaction, Address, Amount,
    Commitment, MintConfigSnapshot,
};

#[doc(hidden)]
pub use self::config::SessionConfig;
#[doc(hidden)]
pub use self::eligibility::{evaluate, EligibilityResult, ReasonCode};
#[doc(hidden)]
pub use self::orchestrator::{
    AlertState, MintAttempt, MintFailure, MintOutcome, MintReceipt, MintState, Severity,
};
#[cfg(feature = "rpc")]
#[doc(hidden)]
pub use self::rpc::HttpClient;
#[doc(hidden)]
pub use self::session::{MintSession, MintSessionBuilder};
pub use self::view::SessionView;

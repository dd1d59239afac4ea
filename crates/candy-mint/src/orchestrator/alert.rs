//! User facing alerts

use std::time::Duration;

use serde::Serialize;

/// Auto-hide delay when none is given
pub const DEFAULT_HIDE_AFTER: Duration = Duration::from_millis(6_000);
/// Auto-hide delay of the success alert
pub const SUCCESS_HIDE_AFTER: Duration = Duration::from_millis(7_000);
/// Auto-hide delay of the "likely failed" alert
pub const LIKELY_FAILED_HIDE_AFTER: Duration = Duration::from_millis(8_000);

/// Alert texts
pub mod messages {
    /// Setup transaction must be signed
    pub const SIGN_SETUP: &str = "Please sign account setup transaction";
    /// Setup confirmed, mint next
    pub const SETUP_SUCCEEDED: &str = "Setup transaction succeeded! Please sign minting transaction";
    /// Mint transaction must be signed
    pub const SIGN_MINT: &str = "Please sign minting transaction";
    /// First gating pass issuance must be signed
    pub const SIGN_PASS: &str = "Please sign one-time gating pass issuance";
    /// Gating pass refresh in progress
    pub const REFRESHING_PASS: &str = "Refreshing gating pass";
    /// Mint confirmed
    pub const MINT_SUCCEEDED: &str = "Congratulations! Mint succeeded!";
    /// Confirmed, but the metadata account is missing
    pub const MINT_LIKELY_FAILED: &str = "Mint likely failed! Anti-bot SOL 0.01 fee potentially charged! Check the explorer to confirm the mint failed and if so, make sure you are eligible to mint before trying again.";
    /// Generic failure
    pub const MINT_FAILED: &str = "Mint failed! Please try again!";
    /// Confirmation deadline passed
    pub const TIMEOUT: &str = "Transaction timeout! Please try again.";
    /// Signature request declined
    pub const USER_CANCELLED: &str = "User cancelled signing";
    /// On-chain sold out
    pub const SOLD_OUT: &str = "SOLD OUT";
    /// On-chain not live yet
    pub const NOT_LIVE: &str = "Minting period hasn't started yet.";
    /// Fixed end date passed
    pub const ENDED: &str = "Minting period has ended.";
    /// On-chain insufficient funds
    pub const INSUFFICIENT_FUNDS: &str = "Insufficient funds to mint. Please fund your wallet.";
    /// Gating pass required
    pub const PASS_REQUIRED: &str = "A gating pass is required to mint.";
    /// Pass issuance transaction was not confirmed
    pub const PASS_DROPPED: &str = "The network dropped the pass transaction, please try again";
    /// Network failure during a user action
    pub const NETWORK_UNAVAILABLE: &str = "Network request failed, please try again.";
    /// Mint state has not been read yet
    pub const NOT_READY: &str = "Mint state is still loading, please try again.";
}

/// Alert severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information
    #[default]
    Info,
    /// Operation succeeded
    Success,
    /// Retryable problem
    Warning,
    /// Failure
    Error,
}

/// The single alert shown to the user, last write wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertState {
    /// Shown
    pub visible: bool,
    /// Text
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Auto-hide delay, `None` keeps the alert until dismissed
    pub hide_after: Option<Duration>,
}

impl AlertState {
    /// No alert
    pub fn hidden() -> Self {
        Self::default()
    }

    fn visible(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            visible: true,
            message: message.into(),
            severity,
            hide_after: Some(DEFAULT_HIDE_AFTER),
        }
    }

    /// Info alert
    pub fn info(message: impl Into<String>) -> Self {
        Self::visible(message, Severity::Info)
    }

    /// Success alert
    pub fn success(message: impl Into<String>) -> Self {
        Self::visible(message, Severity::Success)
    }

    /// Warning alert
    pub fn warning(message: impl Into<String>) -> Self {
        Self::visible(message, Severity::Warning)
    }

    /// Error alert
    pub fn error(message: impl Into<String>) -> Self {
        Self::visible(message, Severity::Error)
    }

    /// Override the auto-hide delay
    pub fn hide_after(mut self, hide_after: Option<Duration>) -> Self {
        self.hide_after = hide_after;
        self
    }

    /// Error that stays until dismissed
    pub fn persistent(message: impl Into<String>) -> Self {
        Self::error(message).hide_after(None)
    }

    /// Same alert, hidden
    pub fn dismissed(mut self) -> Self {
        self.visible = false;
        self
    }
}

//! Session configuration

use std::time::Duration;

use candy_mint_common::{Address, Commitment};

use crate::watcher::DEFAULT_POLL_INTERVAL;

/// Default deadline for a transaction confirmation
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default interval of the background refresh
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

/// Settings of a [`crate::MintSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address of the mint program account (the candy machine)
    pub machine_id: Address,
    /// Commitment for reads and confirmations
    pub commitment: Commitment,
    /// Deadline of each confirmation wait
    pub confirmation_timeout: Duration,
    /// Interval of the background refresh
    pub refresh_interval: Duration,
    /// Interval between signature status reads
    pub poll_interval: Duration,
}

impl SessionConfig {
    /// Defaults for the given program account
    pub fn new(machine_id: Address) -> Self {
        Self {
            machine_id,
            commitment: Commitment::default(),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the commitment
    pub fn commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Set the confirmation timeout
    pub fn confirmation_timeout(mut self, confirmation_timeout: Duration) -> Self {
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    /// Set the refresh interval
    pub fn refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Set the poll interval
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

//! Background refresh worker

use std::sync::Arc;
use std::time::Duration;

use candy_mint_common::clock::ledger_now;
use candy_mint_common::{Address, Commitment, Error};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::fetcher::StateFetcher;
use crate::orchestrator::{messages, AlertState};
use crate::view::Shared;

/// Messages for the background refresh task
#[derive(Debug)]
pub(super) enum MessageToWorker {
    /// Stop the refresh task
    Stop,
    /// Refresh now
    Refresh {
        /// Commitment of the reads
        commitment: Commitment,
        /// Requested by the user, transient failures are surfaced
        user_initiated: bool,
    },
}

/// Whether the loop keeps running
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Halt,
}

/// Refresh once and publish the result.
///
/// Configuration errors halt the session with a persistent alert. Transient
/// errors are left to the next scheduled refresh, and only surfaced when the
/// user asked for this refresh.
pub(super) async fn refresh_once(
    fetcher: &StateFetcher,
    shared: &Shared,
    machine_id: &Address,
    wallet: &Address,
    commitment: Commitment,
    user_initiated: bool,
) -> Flow {
    match fetcher.refresh(machine_id, wallet, commitment).await {
        Ok(refreshed) => {
            shared.store_refresh(refreshed);
            Flow::Continue
        }
        Err(err) if err.is_configuration() => {
            tracing::error!("Configuration error refreshing {}: {}", machine_id, err);
            shared.halt(AlertState::persistent(configuration_message(
                machine_id, &err,
            )));
            Flow::Halt
        }
        Err(err) => {
            tracing::warn!("Refresh of {} failed: {}", machine_id, err);
            if user_initiated {
                shared.set_alert(AlertState::warning(messages::NETWORK_UNAVAILABLE));
            }
            Flow::Continue
        }
    }
}

fn configuration_message(machine_id: &Address, err: &Error) -> String {
    match err {
        Error::AccountNotFound(_) | Error::WrongOwner { .. } => format!(
            "Couldn't fetch candy machine state from candy machine with address: {}! The machine id is probably wrong, or the RPC points to another network.",
            machine_id
        ),
        err => format!("Couldn't read candy machine {}: {}", machine_id, err),
    }
}

/// Time until the next scheduled refresh: the interval, or less when the
/// mint goes live sooner so eligibility flips on time
fn next_wake(shared: &Shared, refresh_interval: Duration) -> Duration {
    let go_live = shared
        .refreshed()
        .and_then(|refreshed| refreshed.snapshot.go_live);
    let now = ledger_now();

    match go_live {
        Some(go_live) if go_live > now => {
            let until = Duration::from_secs(u64::try_from(go_live - now).unwrap_or(u64::MAX));
            until.min(refresh_interval)
        }
        _ => refresh_interval,
    }
}

/// Refresh loop, runs for the session lifetime
pub(super) async fn refresh_loop(
    fetcher: Arc<StateFetcher>,
    shared: Arc<Shared>,
    machine_id: Address,
    wallet: Address,
    default_commitment: Commitment,
    mut rx: mpsc::Receiver<MessageToWorker>,
    refresh_interval: Duration,
) {
    tracing::debug!(
        "Starting refresh loop for {} (interval: {:?})",
        machine_id,
        refresh_interval
    );

    loop {
        let wake = next_wake(&shared, refresh_interval);

        let flow = tokio::select! {
            Some(msg) = rx.recv() => {
                match msg {
                    MessageToWorker::Stop => {
                        tracing::debug!("Stopping refresh loop for {}", machine_id);
                        break;
                    }
                    MessageToWorker::Refresh { commitment, user_initiated } => {
                        tracing::debug!("Refresh requested for {} at {}", machine_id, commitment);
                        refresh_once(&fetcher, &shared, &machine_id, &wallet, commitment, user_initiated).await
                    }
                }
            }
            _ = sleep(wake) => {
                tracing::trace!("Time to refresh {}", machine_id);
                refresh_once(&fetcher, &shared, &machine_id, &wallet, default_commitment, false).await
            }
        };

        if flow == Flow::Halt {
            break;
        }
    }

    tracing::debug!("Refresh loop ended for {}", machine_id);
}

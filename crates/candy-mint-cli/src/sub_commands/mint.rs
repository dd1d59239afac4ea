use anyhow::{bail, Result};
use candy_mint::{MintAttempt, MintOutcome, MintSession};

use super::status::print_view;
use crate::config::{Backend, Settings};

/// Mint one item
pub async fn mint(session: &MintSession, settings: &Settings) -> Result<()> {
    if settings.backend != Backend::Fake {
        bail!("Minting signs transactions and is only available with the fake backend");
    }

    let attempt = session.request_mint().await;
    let view = session.view();

    match attempt {
        MintAttempt::AlreadyInFlight => println!("A mint is already running"),
        MintAttempt::Settled {
            outcome: MintOutcome::Success(receipt),
            ..
        } => {
            println!("Minted {}", receipt.mint);
            println!("Signature: {}", receipt.signature);
            println!("Metadata: {}", receipt.metadata);
        }
        MintAttempt::Settled {
            outcome: MintOutcome::Failure(failure),
            ..
        } => {
            print_view(&view);
            bail!("Mint failed: {}", failure);
        }
    }

    session.shutdown().await;

    Ok(())
}

use anyhow::Result;
use candy_mint::MintSession;
use clap::Args;

use super::status::print_view;

#[derive(Args)]
pub struct WatchSubCommand {
    /// Stop after this many updates
    #[arg(short, long)]
    count: Option<u64>,
}

/// Print the view on every refresh until interrupted
pub async fn watch(session: &MintSession, sub_command_args: &WatchSubCommand) -> Result<()> {
    let mut updates = session.subscribe();
    let mut seen = 0;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    tracing::warn!("Session closed");
                    break;
                }

                let view = updates.borrow_and_update().clone();
                println!("--- refresh {} ---", view.refresh_version);
                print_view(&view);

                if view.halted {
                    break;
                }

                seen += 1;
                if sub_command_args.count.is_some_and(|count| seen >= count) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    session.shutdown().await;

    Ok(())
}

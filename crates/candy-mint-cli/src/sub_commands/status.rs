use anyhow::Result;
use candy_mint::{MintSession, SessionView};

/// Print the drop and the wallet's eligibility
pub async fn status(session: &MintSession) -> Result<()> {
    let commitment = session.config().commitment;
    session.refresh(commitment).await?;

    print_view(&session.view());

    Ok(())
}

pub fn print_view(view: &SessionView) {
    let Some(snapshot) = &view.snapshot else {
        println!("Not loaded");
        return;
    };

    println!("Candy machine: {}", snapshot.address);
    println!(
        "Redeemed: {} / {} ({} remaining)",
        snapshot.items_redeemed,
        snapshot.total_supply,
        snapshot.items_remaining()
    );
    match snapshot.token_mint {
        Some(token_mint) => println!("Price: {} of {}", snapshot.effective_price(), token_mint),
        None => println!("Price: {} SOL", snapshot.effective_price().to_sol_string()),
    }
    if let Some(go_live) = snapshot.go_live {
        println!("Go live: {}", go_live);
    }
    if let Some(balance) = view.native_balance {
        println!("Wallet balance: {} SOL", balance.to_sol_string());
    }

    if let Some(eligibility) = &view.eligibility {
        let reasons: Vec<String> = eligibility.reasons.iter().map(ToString::to_string).collect();
        println!(
            "Active: {}, presale: {}, sold out: {}, can mint: {}",
            eligibility.is_active,
            eligibility.is_presale,
            eligibility.is_sold_out,
            view.can_mint()
        );
        if !reasons.is_empty() {
            println!("Reasons: {}", reasons.join(", "));
        }
    }

    println!("State: {}", view.state);
    if view.alert.visible {
        println!("[{}] {}", severity(view), view.alert.message);
    }
}

fn severity(view: &SessionView) -> &'static str {
    match view.alert.severity {
        candy_mint::Severity::Info => "info",
        candy_mint::Severity::Success => "success",
        candy_mint::Severity::Warning => "warning",
        candy_mint::Severity::Error => "error",
    }
}

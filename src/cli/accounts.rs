use tracing::warn;

use crate::account::types::Account;
use crate::session::{SelectEvent, SessionController, SessionView};

fn print_account(index: usize, account: &Account) {
    let marker = if account.is_active { "*" } else { " " };
    println!(
        "{} [{}] {}\tAddress: {}\tSource: {}",
        marker,
        index,
        account.label(),
        account.address,
        account.meta.source
    );
}

fn print_balance(session: &SessionController) {
    match (session.current_account(), session.account_balance()) {
        (Some(account), Some(balance)) => println!("{}: {}", account.label(), balance),
        (Some(account), None) => println!("{}: balance unavailable", account.label()),
        (None, _) => println!("No active account. Use `select <index>` first."),
    }
}

pub async fn handle_accounts_command(session: &SessionController) {
    if let Err(e) = session.activate().await {
        println!("Failed to start session: {}", e);
        return;
    }
    match session.candidate_accounts() {
        Some(accounts) => {
            println!("Accounts ({}):", accounts.len());
            for (i, account) in accounts.iter().enumerate() {
                print_account(i, account);
            }
        }
        None => println!("No wallet accounts available."),
    }
    session.deactivate().await;
}

pub async fn handle_select_command(session: &SessionController, index: usize) {
    if let Err(e) = session.activate().await {
        println!("Failed to start session: {}", e);
        return;
    }
    let mut event = SelectEvent::new();
    match session.select_account(&mut event, index).await {
        Ok(()) => print_balance(session),
        Err(e) => println!("Selection failed: {}", e),
    }
    session.deactivate().await;
}

pub async fn handle_balance_command(session: &SessionController) {
    if let Err(e) = session.activate().await {
        println!("Failed to start session: {}", e);
        return;
    }
    print_balance(session);
    session.deactivate().await;
}

pub async fn handle_watch_command(session: &SessionController) {
    if let Err(e) = session.activate().await {
        println!("Failed to start session: {}", e);
        return;
    }
    print_balance(session);
    if session.current_account().is_none() {
        session.deactivate().await;
        return;
    }

    let mut balances = session.watch_balance();
    println!("Watching balance. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            changed = balances.changed() => {
                if changed.is_err() {
                    warn!("Balance channel closed");
                    break;
                }
                if let Some(balance) = balances.borrow_and_update().balance.clone() {
                    println!("Balance: {}", balance);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    session.deactivate().await;
}

pub mod accounts;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wallet-session")]
#[command(about = "Wallet account session manager", long_about = None)]
pub struct Cli {
    /// Session config file (created with defaults when missing)
    #[arg(long, default_value = "session.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the accounts exposed by the wallet
    Accounts,
    /// Make an account active and remember it
    Select {
        /// Position in the account list
        index: usize,
    },
    /// Show the active account and its balance
    Balance,
    /// Follow balance changes of the active account until Ctrl+C
    Watch,
}

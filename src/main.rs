use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use wallet_session::cli::{accounts, Cli, Commands};
use wallet_session::client::{RpcClient, RpcLedger};
use wallet_session::config::SessionConfig;
use wallet_session::logging;
use wallet_session::storage;
use wallet_session::wallet::KeyringExtension;
use wallet_session::SessionController;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Subscriber goes up before the config is read so its load warnings show.
    // RUST_LOG wins; otherwise the configured level replaces "info" once known.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (subscriber, filter_handle) = logging::subscriber(
        env_filter.unwrap_or_else(|| EnvFilter::new("info")),
        std::io::stderr,
    );
    subscriber.init();

    let config = SessionConfig::load_or_default(&cli.config);
    if !from_env {
        if let Err(e) = logging::apply_level(&filter_handle, &config.session.log_level) {
            warn!("Could not apply log level {}: {}", config.session.log_level, e);
        }
    }

    info!("Ledger RPC: {}", config.ledger.rpc_url);
    info!("Keyring: {}", config.wallet.keyring_path);

    let storage = storage::open_or_memory(&config.storage.db_path);
    let ledger = RpcLedger::new(
        RpcClient::new(config.ledger.rpc_url.clone()),
        config.poll_interval(),
        config.ledger.decimals,
        &config.ledger.unit,
    );
    let extension = KeyringExtension::new(&config.wallet.keyring_path);

    let session = SessionController::from_config(
        &config,
        Arc::new(extension),
        Arc::new(ledger),
        storage,
    );

    match cli.command {
        Commands::Accounts => accounts::handle_accounts_command(&session).await,
        Commands::Select { index } => accounts::handle_select_command(&session, index).await,
        Commands::Balance => accounts::handle_balance_command(&session).await,
        Commands::Watch => accounts::handle_watch_command(&session).await,
    }

    Ok(())
}

//! Wallet-extension account discovery

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::types::{Account, CandidateList};
use crate::wallet::WalletExtension;

pub struct AccountDiscoverer {
    extension: Arc<dyn WalletExtension>,
    app_label: String,
    ready_timeout: Duration,
}

impl AccountDiscoverer {
    pub fn new(
        extension: Arc<dyn WalletExtension>,
        app_label: impl Into<String>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            extension,
            app_label: app_label.into(),
            ready_timeout,
        }
    }

    /// Enable the extension and enumerate its accounts.
    ///
    /// `None` covers "no wallet installed", "access denied", "no accounts"
    /// and any fault raised by the extension; discovery never fails the session.
    pub async fn discover(&self) -> Option<CandidateList> {
        if tokio::time::timeout(self.ready_timeout, self.extension.ready())
            .await
            .is_err()
        {
            warn!(
                "Wallet extension not ready after {:?}, enabling anyway",
                self.ready_timeout
            );
        }

        let extensions = match self.extension.enable(&self.app_label).await {
            Ok(extensions) => extensions,
            Err(e) => {
                warn!("Wallet extension enable failed: {}", e);
                return None;
            }
        };

        if extensions.is_empty() {
            info!("No wallet extension authorized '{}'", self.app_label);
            return None;
        }

        let injected = match self.extension.list_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Failed to list wallet accounts: {}", e);
                return None;
            }
        };

        if injected.is_empty() {
            info!("Wallet extension exposes no accounts");
            return None;
        }

        info!(
            "Discovered {} account(s) from {} extension(s)",
            injected.len(),
            extensions.len()
        );
        let accounts = injected
            .into_iter()
            .map(|a| Account::new(a.address, a.meta))
            .collect();
        Some(CandidateList::new(accounts))
    }
}

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::account::balance::{BalanceTracker, TrackedBalance};
use crate::account::discovery::AccountDiscoverer;
use crate::account::store::AddressStore;
use crate::account::types::{Account, CandidateList};
use crate::client::ledger::LedgerClient;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::storage::KeyValueStore;
use crate::wallet::WalletExtension;

/// The user interaction that triggered a command
pub trait InteractionEvent {
    /// Keep the interaction from reaching any other handler
    fn stop_propagation(&mut self);
}

/// Plain interaction event for callers without a UI event of their own
#[derive(Debug, Clone, Default)]
pub struct SelectEvent {
    propagation_stopped: bool,
}

impl SelectEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

impl InteractionEvent for SelectEvent {
    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Discovering,
    /// Discovery found no wallet or no accounts
    Idle,
    Ready {
        candidates: CandidateList,
        selection: Option<usize>,
    },
}

/// Read/command surface for presentation code
#[async_trait]
pub trait SessionView: Send + Sync {
    fn current_account(&self) -> Option<Account>;
    fn candidate_accounts(&self) -> Option<CandidateList>;
    fn account_balance(&self) -> Option<String>;

    /// Make `candidates[index]` the active account.
    ///
    /// Stops propagation of `event` before anything else, even when the
    /// selection is then rejected.
    async fn select_account(
        &self,
        event: &mut (dyn InteractionEvent + Send),
        index: usize,
    ) -> Result<(), SessionError>;
}

struct Inner {
    state: SessionState,
    /// Bumped on every activation and deactivation so a discovery that
    /// outlives its session is ignored
    session: u64,
}

/// Account/balance lifecycle for one session.
pub struct SessionController {
    discoverer: AccountDiscoverer,
    address_store: AddressStore,
    tracker: BalanceTracker,
    inner: Mutex<Inner>,
}

impl SessionController {
    pub fn new(
        discoverer: AccountDiscoverer,
        address_store: AddressStore,
        tracker: BalanceTracker,
    ) -> Self {
        Self {
            discoverer,
            address_store,
            tracker,
            inner: Mutex::new(Inner {
                state: SessionState::Uninitialized,
                session: 0,
            }),
        }
    }

    /// Wire a controller from the three capabilities and the session config
    pub fn from_config(
        config: &SessionConfig,
        extension: Arc<dyn WalletExtension>,
        ledger: Arc<dyn LedgerClient>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::new(
            AccountDiscoverer::new(
                extension,
                config.session.app_label.clone(),
                config.ready_timeout(),
            ),
            AddressStore::with_key(storage, config.session.storage_key.clone()),
            BalanceTracker::new(ledger),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State transitions never panic midway, so a poisoned lock still
        // holds a consistent state
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn watch_balance(&self) -> watch::Receiver<TrackedBalance> {
        self.tracker.watch()
    }

    /// Discover accounts and restore the persisted selection.
    ///
    /// Only valid from `Uninitialized`; discovery problems end in `Idle`,
    /// never in an error.
    pub async fn activate(&self) -> Result<(), SessionError> {
        let session = {
            let mut inner = self.lock();
            if inner.state != SessionState::Uninitialized {
                warn!("Session activation requested while already active");
                return Err(SessionError::AlreadyActive);
            }
            inner.state = SessionState::Discovering;
            inner.session += 1;
            inner.session
        };

        info!("Discovering wallet accounts...");
        let discovered = self.discoverer.discover().await;

        let pending = {
            let mut inner = self.lock();
            if inner.session != session || inner.state != SessionState::Discovering {
                debug!("Session ended during discovery, dropping result");
                return Ok(());
            }

            let candidates = match discovered {
                Some(candidates) => candidates,
                None => {
                    info!("No wallet accounts available, session idle");
                    inner.state = SessionState::Idle;
                    return Ok(());
                }
            };

            let restored = self
                .address_store
                .get()
                .and_then(|saved| candidates.position(&saved))
                .and_then(|i| candidates.with_active(i).map(|list| (i, list)));

            match restored {
                Some((index, list)) => {
                    let address = list[index].address.clone();
                    info!("Restored saved account {} ({})", list[index].label(), address);
                    inner.state = SessionState::Ready {
                        candidates: list,
                        selection: Some(index),
                    };
                    Some(self.tracker.track(&address))
                }
                None => {
                    info!("{} account(s) available, none selected", candidates.len());
                    inner.state = SessionState::Ready {
                        candidates,
                        selection: None,
                    };
                    None
                }
            }
        };

        if let Some(tracking) = pending {
            tracking.await;
        }
        Ok(())
    }

    /// End the session: stop balance tracking and return to `Uninitialized`.
    pub async fn deactivate(&self) {
        let stopping = {
            let mut inner = self.lock();
            inner.state = SessionState::Uninitialized;
            inner.session += 1;
            self.tracker.reset()
        };
        stopping.await;
        info!("Session deactivated");
    }
}

#[async_trait]
impl SessionView for SessionController {
    fn current_account(&self) -> Option<Account> {
        match &self.lock().state {
            SessionState::Ready {
                candidates,
                selection: Some(index),
            } => candidates.get(*index).cloned(),
            _ => None,
        }
    }

    fn candidate_accounts(&self) -> Option<CandidateList> {
        match &self.lock().state {
            SessionState::Ready { candidates, .. } => Some(candidates.clone()),
            _ => None,
        }
    }

    fn account_balance(&self) -> Option<String> {
        self.tracker.balance()
    }

    async fn select_account(
        &self,
        event: &mut (dyn InteractionEvent + Send),
        index: usize,
    ) -> Result<(), SessionError> {
        event.stop_propagation();

        let tracking = {
            let mut inner = self.lock();
            let selected = match &inner.state {
                SessionState::Ready { candidates, .. } => {
                    candidates
                        .with_active(index)
                        .ok_or(SessionError::InvalidSelection {
                            index,
                            len: candidates.len(),
                        })
                }
                _ => Err(SessionError::NotReady),
            };
            let list = match selected {
                Ok(list) => list,
                Err(e) => {
                    warn!("Rejected account selection: {}", e);
                    return Err(e);
                }
            };

            let address = list[index].address.clone();
            self.address_store.set(&address);
            info!("Selected account {} ({})", list[index].label(), address);
            inner.state = SessionState::Ready {
                candidates: list,
                selection: Some(index),
            };
            self.tracker.track(&address)
        };

        tracking.await;
        Ok(())
    }
}

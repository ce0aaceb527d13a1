//! Balance tracking for the selected account

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::types::Address;
use crate::client::ledger::{BalanceCallback, LedgerClient};

/// Published balance state shared with readers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedBalance {
    /// Address currently being tracked
    pub address: Option<Address>,
    /// Ledger-formatted balance; kept across a failed fetch
    pub balance: Option<String>,
    epoch: u64,
}

/// Fetches the balance of one address and follows its changes.
///
/// Every `track`/`stop` opens a new epoch before doing anything else.
/// Publication is only accepted for the current epoch, so a fetch or
/// notification belonging to a superseded address is dropped. Subscription
/// setup and teardown are serialized by `subscription`, which also records
/// the address holding the ledger's single subscription slot.
pub struct BalanceTracker {
    ledger: Arc<dyn LedgerClient>,
    state: Arc<watch::Sender<TrackedBalance>>,
    subscription: Mutex<Option<Address>>,
}

impl BalanceTracker {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        let (state, _) = watch::channel(TrackedBalance::default());
        Self {
            ledger,
            state: Arc::new(state),
            subscription: Mutex::new(None),
        }
    }

    pub fn balance(&self) -> Option<String> {
        self.state.borrow().balance.clone()
    }

    pub fn tracked_address(&self) -> Option<Address> {
        self.state.borrow().address.clone()
    }

    pub fn watch(&self) -> watch::Receiver<TrackedBalance> {
        self.state.subscribe()
    }

    /// Fetch the balance of `address`, then follow its changes.
    ///
    /// Supersession happens when this is called, not when the returned
    /// future is first polled, so the call order of `track`/`stop`/`reset`
    /// decides which address wins. Any previous subscription is torn down
    /// first; a failed fetch leaves the published balance as it was.
    pub fn track(&self, address: &str) -> impl Future<Output = ()> + Send + '_ {
        let epoch = self.supersede(Some(address.to_string()), false);
        let address = address.to_string();
        async move { self.follow(epoch, address).await }
    }

    /// Tear down the current subscription, if any. Safe to call repeatedly.
    pub fn stop(&self) -> impl Future<Output = ()> + Send + '_ {
        self.supersede(None, false);
        async move { self.unsubscribe().await }
    }

    /// Like `stop`, and also forget the published balance.
    pub fn reset(&self) -> impl Future<Output = ()> + Send + '_ {
        self.supersede(None, true);
        async move { self.unsubscribe().await }
    }

    async fn follow(&self, epoch: u64, address: String) {
        let mut subscription = self.subscription.lock().await;
        self.teardown(&mut subscription).await;

        if !self.is_current(epoch) {
            debug!("Tracking of {} superseded before fetch", address);
            return;
        }

        match self.ledger.get_balance(&address).await {
            Ok(amount) => {
                if !publish(&self.state, epoch, amount.to_human()) {
                    debug!("Discarding stale balance for {}", address);
                }
            }
            Err(e) => warn!("Failed to fetch balance for {}: {}", address, e),
        }

        if !self.is_current(epoch) {
            debug!("Tracking of {} superseded before subscribe", address);
            return;
        }

        let state = self.state.clone();
        let tracked = address.clone();
        let on_change: BalanceCallback = Arc::new(move |amount| {
            if !publish(&state, epoch, amount.to_human()) {
                debug!("Discarding balance change for superseded {}", tracked);
            }
        });

        match self.ledger.subscribe_balance_change(&address, on_change).await {
            Ok(()) => {
                info!("Subscribed to balance changes for {}", address);
                *subscription = Some(address);
            }
            Err(e) => warn!("Failed to subscribe to balance of {}: {}", address, e),
        }
    }

    async fn unsubscribe(&self) {
        let mut subscription = self.subscription.lock().await;
        self.teardown(&mut subscription).await;
    }

    fn supersede(&self, address: Option<Address>, clear_balance: bool) -> u64 {
        let mut epoch = 0;
        self.state.send_if_modified(|s| {
            s.epoch += 1;
            epoch = s.epoch;
            let mut changed = s.address != address;
            s.address = address;
            if clear_balance {
                changed |= s.balance.take().is_some();
            }
            changed
        });
        epoch
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.borrow().epoch == epoch
    }

    async fn teardown(&self, subscription: &mut Option<Address>) {
        if let Some(address) = subscription.take() {
            self.ledger.unsubscribe_balance_change().await;
            info!("Unsubscribed from balance changes for {}", address);
        }
    }
}

fn publish(state: &watch::Sender<TrackedBalance>, epoch: u64, balance: String) -> bool {
    state.send_if_modified(|s| {
        if s.epoch != epoch {
            return false;
        }
        s.balance = Some(balance);
        true
    })
}

//! In-crate fakes for the wallet, ledger and storage capabilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::account::types::AccountMeta;
use crate::client::ledger::{Amount, BalanceCallback, LedgerClient};
use crate::error::{ExtensionError, LedgerError, StoreError};
use crate::storage::KeyValueStore;
use crate::wallet::{ExtensionHandle, InjectedAccount, WalletExtension};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

// ========== Wallet extension ==========

#[derive(Default)]
struct ExtensionState {
    available: bool,
    accounts: Vec<String>,
    fail_enable: bool,
    fail_list: bool,
    never_ready: bool,
    enabled_labels: Vec<String>,
    list_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeExtension {
    inner: Arc<Mutex<ExtensionState>>,
}

impl FakeExtension {
    pub fn with_accounts(addresses: &[&str]) -> Self {
        let ext = Self::default();
        {
            let mut s = lock(&ext.inner);
            s.available = true;
            s.accounts = addresses.iter().map(|a| a.to_string()).collect();
        }
        ext
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set_accounts(&self, addresses: &[&str]) {
        lock(&self.inner).accounts = addresses.iter().map(|a| a.to_string()).collect();
    }

    pub fn fail_enable(&self) {
        lock(&self.inner).fail_enable = true;
    }

    pub fn fail_list(&self) {
        lock(&self.inner).fail_list = true;
    }

    pub fn never_ready(&self) {
        lock(&self.inner).never_ready = true;
    }

    pub fn enabled_labels(&self) -> Vec<String> {
        lock(&self.inner).enabled_labels.clone()
    }

    pub fn list_calls(&self) -> usize {
        lock(&self.inner).list_calls
    }
}

#[async_trait]
impl WalletExtension for FakeExtension {
    async fn ready(&self) {
        let never = lock(&self.inner).never_ready;
        if never {
            std::future::pending::<()>().await;
        }
    }

    async fn enable(&self, app_label: &str) -> Result<Vec<ExtensionHandle>, ExtensionError> {
        let mut s = lock(&self.inner);
        s.enabled_labels.push(app_label.to_string());
        if s.fail_enable {
            return Err(ExtensionError::AccessDenied("user rejected".to_string()));
        }
        if !s.available {
            return Ok(vec![]);
        }
        Ok(vec![ExtensionHandle {
            name: "fake".to_string(),
            version: "0.0.0".to_string(),
        }])
    }

    async fn list_accounts(&self) -> Result<Vec<InjectedAccount>, ExtensionError> {
        let mut s = lock(&self.inner);
        s.list_calls += 1;
        if s.fail_list {
            return Err(ExtensionError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "extension crashed",
            )));
        }
        Ok(s.accounts
            .iter()
            .map(|a| InjectedAccount {
                address: a.clone(),
                meta: AccountMeta {
                    name: Some(format!("{}-name", a)),
                    source: "fake".to_string(),
                },
            })
            .collect())
    }
}

// ========== Ledger ==========

#[derive(Default)]
struct LedgerState {
    balances: HashMap<String, u128>,
    fail_fetch: bool,
    fail_subscribe: bool,
    live: Option<(String, BalanceCallback)>,
    /// Every callback ever registered, newest last
    history: Vec<(String, BalanceCallback)>,
    holds: HashMap<String, (Arc<Notify>, Arc<Notify>)>,
    fetch_calls: Vec<String>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    overlapping_subscribes: usize,
}

#[derive(Clone, Default)]
pub struct FakeLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: &str, raw: u128) {
        lock(&self.inner).balances.insert(address.to_string(), raw);
    }

    pub fn fail_fetch(&self, fail: bool) {
        lock(&self.inner).fail_fetch = fail;
    }

    pub fn fail_subscribe(&self, fail: bool) {
        lock(&self.inner).fail_subscribe = fail;
    }

    /// Block the next fetch for `address`. Returns (started, release).
    pub fn hold_fetch(&self, address: &str) -> (Arc<Notify>, Arc<Notify>) {
        let pair = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        lock(&self.inner)
            .holds
            .insert(address.to_string(), pair.clone());
        pair
    }

    /// Push a change through the live subscription, if it is for `address`.
    pub fn push(&self, address: &str, raw: u128) {
        let callback = {
            let s = lock(&self.inner);
            match &s.live {
                Some((a, cb)) if a == address => Some(cb.clone()),
                _ => None,
            }
        };
        if let Some(cb) = callback {
            cb(Amount::new(raw, 0, ""));
        }
    }

    /// Deliver a notification through the newest callback ever registered
    /// for `address`, live or not.
    pub fn fire_stale(&self, address: &str, raw: u128) {
        let callback = lock(&self.inner)
            .history
            .iter()
            .rev()
            .find(|(a, _)| a == address)
            .map(|(_, cb)| cb.clone());
        if let Some(cb) = callback {
            cb(Amount::new(raw, 0, ""));
        }
    }

    pub fn live_subscription(&self) -> Option<String> {
        lock(&self.inner).live.as_ref().map(|(a, _)| a.clone())
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        lock(&self.inner).fetch_calls.clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        lock(&self.inner).subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        lock(&self.inner).unsubscribe_calls
    }

    /// Subscribes made while another subscription was still live
    pub fn overlapping_subscribes(&self) -> usize {
        lock(&self.inner).overlapping_subscribes
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn get_balance(&self, address: &str) -> Result<Amount, LedgerError> {
        let hold = {
            let mut s = lock(&self.inner);
            s.fetch_calls.push(address.to_string());
            s.holds.remove(address)
        };
        if let Some((started, release)) = hold {
            started.notify_one();
            release.notified().await;
        }

        let s = lock(&self.inner);
        if s.fail_fetch {
            return Err(LedgerError::Request("connection refused".to_string()));
        }
        Ok(Amount::new(
            s.balances.get(address).copied().unwrap_or(0),
            0,
            "",
        ))
    }

    async fn subscribe_balance_change(
        &self,
        address: &str,
        on_change: BalanceCallback,
    ) -> Result<(), LedgerError> {
        let mut s = lock(&self.inner);
        s.subscribe_calls += 1;
        if s.fail_subscribe {
            return Err(LedgerError::Subscription("socket closed".to_string()));
        }
        if s.live.is_some() {
            s.overlapping_subscribes += 1;
        }
        s.history.push((address.to_string(), on_change.clone()));
        s.live = Some((address.to_string(), on_change));
        Ok(())
    }

    async fn unsubscribe_balance_change(&self) {
        let mut s = lock(&self.inner);
        s.unsubscribe_calls += 1;
        s.live = None;
    }
}

// ========== Storage ==========

/// Storage whose every call fails
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::DatabaseError("disk unavailable".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::DatabaseError("disk unavailable".to_string()))
    }
}

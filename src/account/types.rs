//! Account type definitions

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Account address - opaque, stable across sessions
pub type Address = String;

/// Display metadata provided by the wallet extension, passed through untouched
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AccountMeta {
    pub name: Option<String>,
    pub source: String,
}

/// One wallet-extension identity
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub meta: AccountMeta,
    #[serde(default)]
    pub is_active: bool,
}

impl Account {
    pub fn new(address: impl Into<Address>, meta: AccountMeta) -> Self {
        Self {
            address: address.into(),
            meta,
            is_active: false,
        }
    }

    /// Name if the extension provided one, otherwise the address
    pub fn label(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.address)
    }
}

/// Ordered accounts from one discovery.
///
/// Immutable once built: selection produces a new list, so readers holding
/// an older list never see it change underneath them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateList {
    accounts: Arc<[Account]>,
}

impl CandidateList {
    /// Build a list with every account inactive.
    pub fn new(accounts: Vec<Account>) -> Self {
        let accounts: Vec<Account> = accounts
            .into_iter()
            .map(|mut a| {
                a.is_active = false;
                a
            })
            .collect();
        Self {
            accounts: accounts.into(),
        }
    }

    /// Copy of this list with only `index` marked active.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn with_active(&self, index: usize) -> Option<Self> {
        if index >= self.accounts.len() {
            return None;
        }
        let accounts: Vec<Account> = self
            .accounts
            .iter()
            .enumerate()
            .map(|(i, a)| Account {
                is_active: i == index,
                ..a.clone()
            })
            .collect();
        Some(Self {
            accounts: accounts.into(),
        })
    }

    /// Index of the first account with `address`
    pub fn position(&self, address: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.address == address)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.accounts.iter().position(|a| a.is_active)
    }
}

impl Deref for CandidateList {
    type Target = [Account];

    fn deref(&self) -> &[Account] {
        &self.accounts
    }
}

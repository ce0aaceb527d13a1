use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use crate::account::types::AccountMeta;
use crate::error::ExtensionError;

/// One extension that answered an `enable` request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHandle {
    pub name: String,
    pub version: String,
}

/// Account as exposed by an extension, before the session attaches state to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InjectedAccount {
    pub address: String,
    pub meta: AccountMeta,
}

/// Wallet-extension capability.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Resolves once the extension has finished injecting itself.
    /// Extensions that are always ready keep the default.
    async fn ready(&self) {}

    /// Ask every installed extension for access under `app_label`.
    async fn enable(&self, app_label: &str) -> Result<Vec<ExtensionHandle>, ExtensionError>;

    /// All accounts exposed by the enabled extensions.
    async fn list_accounts(&self) -> Result<Vec<InjectedAccount>, ExtensionError>;
}

/// Keyring file entry: `{ "address": "...", "name": "..." }`
#[derive(Serialize, Deserialize, Debug, Clone)]
struct KeyringEntry {
    address: String,
    #[serde(default)]
    name: Option<String>,
}

/// Local wallet extension backed by a JSON keyring file.
///
/// A missing file means "no extension installed"; the file is re-read on
/// every call so edits show up on the next discovery.
pub struct KeyringExtension {
    path: PathBuf,
}

impl KeyringExtension {
    pub const SOURCE: &'static str = "keyring";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<KeyringEntry>, ExtensionError> {
        let data = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        Ok(serde_json::from_str(&data)?)
    }

    /// A keyring the process may not read is a refusal, not a broken file.
    fn read_error(&self, e: io::Error) -> ExtensionError {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                ExtensionError::AccessDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => ExtensionError::Io(e),
        }
    }
}

#[async_trait]
impl WalletExtension for KeyringExtension {
    async fn enable(&self, app_label: &str) -> Result<Vec<ExtensionHandle>, ExtensionError> {
        match fs::File::open(&self.path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Keyring {} not found, no extension for {}", self.path.display(), app_label);
                return Ok(vec![]);
            }
            Err(e) => return Err(self.read_error(e)),
        }
        Ok(vec![ExtensionHandle {
            name: Self::SOURCE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }])
    }

    async fn list_accounts(&self) -> Result<Vec<InjectedAccount>, ExtensionError> {
        let accounts = self
            .load()?
            .into_iter()
            .map(|entry| InjectedAccount {
                address: entry.address,
                meta: AccountMeta {
                    name: entry.name,
                    source: Self::SOURCE.to_string(),
                },
            })
            .collect();
        Ok(accounts)
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionConfig {
    pub session: SessionSection,
    pub ledger: LedgerConfig,
    pub storage: StorageConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionSection {
    /// Label presented to the wallet extension when requesting access
    #[serde(default = "default_app_label")]
    pub app_label: String,
    /// Key under which the last selected address is persisted
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Upper bound on waiting for the extension to report readiness
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_app_label() -> String {
    "Gear App".to_string()
}

fn default_storage_key() -> String {
    "savedAccount".to_string()
}

fn default_ready_timeout_ms() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LedgerConfig {
    pub rpc_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Display unit used when the node omits one
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Decimal places used when the node omits them
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_unit() -> String {
    "Unit".to_string()
}

fn default_decimals() -> u32 {
    12
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletConfig {
    pub keyring_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session: SessionSection {
                app_label: default_app_label(),
                storage_key: default_storage_key(),
                ready_timeout_ms: default_ready_timeout_ms(),
                log_level: default_log_level(),
            },
            ledger: LedgerConfig {
                rpc_url: "http://127.0.0.1:9000".to_string(),
                poll_interval_ms: default_poll_interval_ms(),
                unit: default_unit(),
                decimals: default_decimals(),
            },
            storage: StorageConfig {
                db_path: "./data/session".to_string(),
            },
            wallet: WalletConfig {
                keyring_path: "keyring.json".to_string(),
            },
        }
    }
}

impl SessionConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.session.ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ledger.poll_interval_ms.max(1))
    }

    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => {
                        info!("Config loaded from {}", path);
                        c
                    }
                    Err(e) => {
                        warn!("Error parsing config: {}. Using defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Error reading config: {}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }
}

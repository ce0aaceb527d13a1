// JSON-RPC ledger client
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ledger::{Amount, BalanceCallback, LedgerClient};
use crate::error::LedgerError;

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    async fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Response(e.to_string()))?;

        if let Some(error) = json.get("error") {
            return Err(LedgerError::Node(
                error["message"].as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        Ok(json["result"].clone())
    }

    /// `getBalance` for `address`. The node may omit `decimals` and `unit`,
    /// in which case `fallback` supplies them.
    pub async fn get_balance(
        &self,
        address: &str,
        fallback: &Amount,
    ) -> Result<Amount, LedgerError> {
        let result = self
            .send_request("getBalance", json!({ "address": address }))
            .await?;
        parse_balance(&result, fallback)
    }
}

fn parse_balance(result: &serde_json::Value, fallback: &Amount) -> Result<Amount, LedgerError> {
    let balance = &result["balance"];
    // Large balances arrive as strings to survive JSON number precision
    let raw = if let Some(n) = balance.as_u64() {
        n as u128
    } else if let Some(s) = balance.as_str() {
        s.parse::<u128>()
            .map_err(|e| LedgerError::Response(format!("Invalid balance '{}': {}", s, e)))?
    } else {
        return Err(LedgerError::Response("No 'balance' field in response".to_string()));
    };

    Ok(Amount {
        raw,
        decimals: result["decimals"]
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(fallback.decimals),
        unit: result["unit"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.unit.clone()),
    })
}

/// `LedgerClient` over a JSON-RPC node.
///
/// The node has no push channel, so a subscription is a polling task. The
/// balance read at subscribe time is delivered right away, then the callback
/// fires whenever a poll differs from the last delivered value.
pub struct RpcLedger {
    client: Arc<RpcClient>,
    poll_interval: Duration,
    template: Amount,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl RpcLedger {
    pub fn new(client: RpcClient, poll_interval: Duration, decimals: u32, unit: &str) -> Self {
        Self {
            client: Arc::new(client),
            poll_interval,
            template: Amount::new(0, decimals, unit),
            subscription: Mutex::new(None),
        }
    }

    fn replace_subscription(&self, next: Option<JoinHandle<()>>) {
        let previous = match self.subscription.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        };
        if let Some(handle) = previous {
            handle.abort();
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn get_balance(&self, address: &str) -> Result<Amount, LedgerError> {
        self.client.get_balance(address, &self.template).await
    }

    async fn subscribe_balance_change(
        &self,
        address: &str,
        on_change: BalanceCallback,
    ) -> Result<(), LedgerError> {
        // Delivered so a change since the caller's own fetch is not lost
        let mut last = self
            .client
            .get_balance(address, &self.template)
            .await
            .map_err(|e| LedgerError::Subscription(e.to_string()))?;
        on_change(last.clone());

        let client = self.client.clone();
        let template = self.template.clone();
        let address = address.to_string();
        let period = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                match client.get_balance(&address, &template).await {
                    Ok(amount) if amount != last => {
                        debug!("Balance change for {}: {}", address, amount.to_human());
                        last = amount.clone();
                        on_change(amount);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Balance poll for {} failed: {}", address, e),
                }
            }
        });

        self.replace_subscription(Some(handle));
        Ok(())
    }

    async fn unsubscribe_balance_change(&self) {
        self.replace_subscription(None);
    }
}

impl Drop for RpcLedger {
    fn drop(&mut self) {
        self.replace_subscription(None);
    }
}

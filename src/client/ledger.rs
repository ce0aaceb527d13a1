//! Ledger client capability and the amounts it reports

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::LedgerError;

/// Balance as reported by the ledger node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u128,
    pub decimals: u32,
    pub unit: String,
}

impl Amount {
    pub fn new(raw: u128, decimals: u32, unit: impl Into<String>) -> Self {
        Self {
            raw,
            decimals,
            unit: unit.into(),
        }
    }

    /// Human-readable form: grouped integer part, trimmed fraction, unit.
    pub fn to_human(&self) -> String {
        let value = i128::try_from(self.raw)
            .ok()
            .and_then(|raw| Decimal::try_from_i128_with_scale(raw, self.decimals).ok());
        let text = match value {
            Some(d) => d.normalize().to_string(),
            None => shift_point(&self.raw.to_string(), self.decimals),
        };

        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if let Some(f) = frac_part {
            grouped.push('.');
            grouped.push_str(f);
        }
        if !self.unit.is_empty() {
            grouped.push(' ');
            grouped.push_str(&self.unit);
        }
        grouped
    }
}

/// Places the decimal point `decimals` digits from the right of `digits` and
/// drops trailing fractional zeros. Used where `Decimal` cannot hold the value
/// (more than 28 decimals or a mantissa above 96 bits).
fn shift_point(digits: &str, decimals: u32) -> String {
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits.to_string();
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Invoked with every balance change pushed by the ledger
pub type BalanceCallback = Arc<dyn Fn(Amount) + Send + Sync>;

/// Ledger client capability.
///
/// Subscriptions use a single slot: a new subscribe replaces the previous
/// one and `unsubscribe_balance_change` clears it.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn get_balance(&self, address: &str) -> Result<Amount, LedgerError>;

    async fn subscribe_balance_change(
        &self,
        address: &str,
        on_change: BalanceCallback,
    ) -> Result<(), LedgerError>;

    async fn unsubscribe_balance_change(&self);
}

//! Sales aggregation for the analytics view.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl TransactionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" | "canceled" => Ok(TransactionStatus::Cancelled),
            "refunded" => Ok(TransactionStatus::Refunded),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub store_id: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSales {
    pub store_id: String,
    pub transaction_count: u64,
    pub total: Decimal,
    /// Share of the grand total, in percent, rounded to two places.
    pub share_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub grand_total: Decimal,
    pub transaction_count: u64,
    pub stores: Vec<StoreSales>,
}

/// Group completed transactions by store, largest seller first.
#[must_use]
pub fn summarize_sales(transactions: &[TransactionRecord]) -> SalesSummary {
    let mut per_store: HashMap<&str, (u64, Decimal)> = HashMap::new();
    let mut grand_total = Decimal::ZERO;
    let mut transaction_count = 0_u64;

    for tx in transactions
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Completed)
    {
        let entry = per_store.entry(tx.store_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += tx.amount;
        grand_total += tx.amount;
        transaction_count += 1;
    }

    let mut stores: Vec<StoreSales> = per_store
        .into_iter()
        .map(|(store_id, (count, total))| StoreSales {
            store_id: store_id.to_string(),
            transaction_count: count,
            total,
            share_percent: share_of(total, grand_total),
        })
        .collect();
    stores.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.store_id.cmp(&b.store_id))
    });

    SalesSummary {
        grand_total,
        transaction_count,
        stores,
    }
}

fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

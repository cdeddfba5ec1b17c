//! Import of a realtime-database JSON export into Postgres.
//!
//! The export is a single object keyed by collection. Stores may appear under
//! `stores` or, for registrations that were never approved, under
//! `store_registrations` / `registrations`. Within each collection the key is
//! the record id.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tindago_core::records::parse_timestamp;
use tindago_core::{RawStoreRecord, StoreRecord, TransactionRecord, TransactionStatus};

use crate::{stores, transactions, DbError};

const STORE_COLLECTIONS: [&str; 3] = ["stores", "store_registrations", "registrations"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    store_id: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    total_amount: Option<Decimal>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<Value>,
}

/// Everything an export file contributes, already normalized.
#[derive(Debug, Default)]
pub struct ExportBundle {
    pub stores: Vec<StoreRecord>,
    pub transactions: Vec<TransactionRecord>,
    /// Entries that could not be normalized, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub stores: usize,
    pub transactions: usize,
    pub skipped: usize,
}

impl ExportBundle {
    /// Parse an export file. Malformed entries are skipped and reported;
    /// only a file that is not a JSON object fails outright.
    ///
    /// When an id appears more than once, the first occurrence wins and the
    /// later ones are reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidExport`] if `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, DbError> {
        let root: BTreeMap<String, Value> =
            serde_json::from_str(json).map_err(|e| DbError::InvalidExport(e.to_string()))?;

        let mut bundle = ExportBundle::default();
        let mut seen = HashSet::new();

        for collection in STORE_COLLECTIONS {
            let Some(Value::Object(entries)) = root.get(collection) else {
                continue;
            };
            for (key, value) in entries {
                let parsed = serde_json::from_value::<RawStoreRecord>(value.clone())
                    .map_err(|e| e.to_string())
                    .and_then(|raw| raw.into_record(key).map_err(|e| e.to_string()));
                match parsed {
                    Ok(record) if seen.insert(record.id.clone()) => bundle.stores.push(record),
                    Ok(record) => bundle.skipped.push((
                        format!("{collection}/{key}"),
                        format!("duplicate id '{}'; an earlier entry was kept", record.id),
                    )),
                    Err(reason) => bundle.skipped.push((format!("{collection}/{key}"), reason)),
                }
            }
        }

        if let Some(Value::Object(entries)) = root.get("transactions") {
            for (key, value) in entries {
                match parse_transaction(key, value) {
                    Ok(tx) => bundle.transactions.push(tx),
                    Err(reason) => bundle.skipped.push((format!("transactions/{key}"), reason)),
                }
            }
        }

        Ok(bundle)
    }
}

fn parse_transaction(key: &str, value: &Value) -> Result<TransactionRecord, String> {
    let raw: RawTransaction = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    let store_id = raw
        .store_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "missing storeId".to_string())?;
    let amount = raw
        .amount
        .or(raw.total_amount)
        .ok_or_else(|| "missing amount".to_string())?;
    let status = raw
        .status
        .as_deref()
        .unwrap_or("pending")
        .parse::<TransactionStatus>()?;

    Ok(TransactionRecord {
        id: raw.id.unwrap_or_else(|| key.to_string()),
        store_id,
        amount: amount.round_dp(2),
        status,
        created_at: raw.created_at.as_ref().and_then(parse_timestamp),
    })
}

/// Upsert every record of `bundle` in one transaction; a failure rolls back
/// the whole import.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn import_export(pool: &PgPool, bundle: &ExportBundle) -> Result<ImportSummary, DbError> {
    let mut tx = pool.begin().await?;

    for record in &bundle.stores {
        stores::upsert_store(&mut *tx, record).await?;
    }
    for transaction in &bundle.transactions {
        transactions::upsert_transaction(&mut *tx, transaction).await?;
    }

    tx.commit().await?;

    let summary = ImportSummary {
        stores: bundle.stores.len(),
        transactions: bundle.transactions.len(),
        skipped: bundle.skipped.len(),
    };
    tracing::info!(
        stores = summary.stores,
        transactions = summary.transactions,
        skipped = summary.skipped,
        "export imported"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tindago_core::StoreStatus;

    const EXPORT: &str = r#"{
        "stores": {
            "store-1": {
                "status": "active",
                "storeName": "Aling Nena's",
                "ownerName": "Nena Reyes"
            }
        },
        "store_registrations": {
            "reg-1": {
                "personalInfo": {"name": "Mang Tonyo"},
                "businessInfo": {"storeName": "Tonyo's"},
                "documents": {"validId": "data:image/png;base64,AAA="}
            },
            "store-1": {"status": "pending"},
            "reg-bad": {"status": "archived"}
        },
        "transactions": {
            "tx-1": {"storeId": "store-1", "amount": 125.5, "status": "completed", "createdAt": 1700000000000},
            "tx-2": {"storeId": "store-1", "totalAmount": "80.00", "status": "cancelled"},
            "tx-3": {"amount": 10}
        }
    }"#;

    #[test]
    fn parses_stores_registrations_and_transactions() {
        let bundle = ExportBundle::from_json(EXPORT).unwrap();

        let ids: Vec<_> = bundle.stores.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["store-1", "reg-1"]);
        assert_eq!(bundle.stores[0].status, StoreStatus::Active);
        assert_eq!(bundle.stores[1].status, StoreStatus::Pending);
        assert_eq!(bundle.stores[1].owner_name.as_deref(), Some("Mang Tonyo"));

        assert_eq!(bundle.transactions.len(), 2);
        assert_eq!(bundle.transactions[0].amount, Decimal::new(12_550, 2));
        assert_eq!(bundle.transactions[1].amount, Decimal::new(8_000, 2));
        assert_eq!(bundle.transactions[1].status, TransactionStatus::Cancelled);
    }

    #[test]
    fn malformed_entries_are_skipped_with_reason() {
        let bundle = ExportBundle::from_json(EXPORT).unwrap();
        let skipped: Vec<_> = bundle.skipped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            skipped,
            vec![
                "store_registrations/reg-bad",
                "store_registrations/store-1",
                "transactions/tx-3"
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_reported_as_skipped() {
        let bundle = ExportBundle::from_json(EXPORT).unwrap();
        let (_, reason) = bundle
            .skipped
            .iter()
            .find(|(key, _)| key == "store_registrations/store-1")
            .expect("duplicate entry should be reported");
        assert!(reason.contains("duplicate id 'store-1'"), "{reason}");

        let read = bundle.stores.len() + bundle.transactions.len() + bundle.skipped.len();
        assert_eq!(read, 7);
    }

    #[test]
    fn non_object_file_is_rejected() {
        let err = ExportBundle::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DbError::InvalidExport(_)));
    }

    #[test]
    fn empty_object_is_an_empty_bundle() {
        let bundle = ExportBundle::from_json("{}").unwrap();
        assert!(bundle.stores.is_empty());
        assert!(bundle.transactions.is_empty());
    }
}

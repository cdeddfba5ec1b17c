//! Offline unit tests for tindago-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tindago_core::{AppConfig, DocumentKind, Environment, StoreStatus, TransactionStatus};
use tindago_db::{DbError, PoolConfig, StoreRow, TransactionRow};

fn store_row(status: &str, documents: serde_json::Value) -> StoreRow {
    StoreRow {
        id: "reg-1".to_string(),
        status: status.to_string(),
        store_name: Some("Aling Nena's".to_string()),
        owner_name: Some("Nena Reyes".to_string()),
        owner_email: None,
        owner_phone: None,
        address: None,
        business_category: Some("sari-sari".to_string()),
        description: None,
        documents,
        status_reason: None,
        rejection_reason: Some("blurry permit".to_string()),
        version: 4,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        blob_ttl_secs: 900,
        default_page_size: 50,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn store_row_converts_to_record() {
    let row = store_row(
        "rejected",
        json!({"validId": {"url": "https://res.cloudinary.com/id.png"}, "selfie": "x"}),
    );

    let record = row.into_record().expect("row converts");
    assert_eq!(record.status, StoreStatus::Rejected);
    assert_eq!(record.version, 4);
    assert_eq!(record.rejection_reason.as_deref(), Some("blurry permit"));
    assert!(record.created_at.is_some());

    let kinds: Vec<_> = record.uploaded_documents().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DocumentKind::ValidId]);
    assert_eq!(record.documents.keys().count(), 2);
}

#[test]
fn store_row_with_unknown_status_is_invalid() {
    let err = store_row("archived", json!({})).into_record().unwrap_err();
    assert!(
        matches!(err, DbError::InvalidStoredValue { ref id, .. } if id == "reg-1"),
        "expected InvalidStoredValue, got {err:?}"
    );
}

#[test]
fn store_row_with_non_object_documents_is_invalid() {
    let err = store_row("pending", json!([1, 2])).into_record().unwrap_err();
    assert!(matches!(err, DbError::InvalidStoredValue { .. }));
}

#[test]
fn transaction_row_converts_to_record() {
    let row = TransactionRow {
        id: "tx-1".to_string(),
        store_id: "store-1".to_string(),
        amount: Decimal::new(12_550, 2),
        status: "completed".to_string(),
        created_at: None,
    };

    let record = row.into_record().expect("row converts");
    assert_eq!(record.status, TransactionStatus::Completed);
    assert_eq!(record.amount, Decimal::new(12_550, 2));
}

#[test]
fn stale_write_error_names_expected_state() {
    let err = DbError::StaleStoreWrite {
        id: "reg-1".to_string(),
        expected_status: "pending",
        expected_version: 3,
    };
    assert_eq!(
        err.to_string(),
        "store reg-1 is no longer 'pending' at version 3"
    );
}

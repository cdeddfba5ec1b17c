//! Live integration tests for tindago-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/tindago-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use rust_decimal::Decimal;
use tindago_core::{
    summarize_sales, DocumentEntry, DocumentKind, LifecycleAction, LifecycleEngine,
    LifecycleError, StatusWrite, StoreRecord, StoreStatus, TransactionRecord, TransactionStatus,
    TransitionRequest,
};
use tindago_db::{
    delete_store, get_store, import_export, list_stores, list_transactions, update_store_status,
    upsert_store, upsert_transaction, DbError, ExportBundle, PgRecordStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_store(pool: &sqlx::PgPool, id: &str, status: StoreStatus) -> StoreRecord {
    let mut record = StoreRecord::new(id);
    record.status = status;
    record.store_name = Some(format!("Store {id}"));
    upsert_store(pool, &record)
        .await
        .unwrap_or_else(|e| panic!("insert_store failed for '{id}': {e}"))
        .into_record()
        .expect("row converts")
}

fn status_write(record: &StoreRecord, new_status: StoreStatus) -> StatusWrite {
    StatusWrite {
        id: record.id.clone(),
        expected_status: record.status,
        expected_version: record.version,
        new_status,
        status_reason: None,
        rejection_reason: None,
    }
}

// ---------------------------------------------------------------------------
// Section 1: Stores
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_then_get_round_trips_documents(pool: sqlx::PgPool) {
    let mut record = StoreRecord::new("reg-1");
    record.documents.insert(
        DocumentKind::BusinessPermit,
        DocumentEntry::LegacyString("data:image/png;base64,AAA=".to_string()),
    );
    upsert_store(&pool, &record).await.expect("upsert failed");

    let fetched = get_store(&pool, "reg-1")
        .await
        .expect("get failed")
        .into_record()
        .expect("row converts");

    assert_eq!(fetched.status, StoreStatus::Pending);
    assert_eq!(fetched.version, 1);
    assert_eq!(fetched.documents, record.documents);
}

#[sqlx::test(migrations = "../../migrations")]
async fn re_upsert_bumps_version(pool: sqlx::PgPool) {
    let first = insert_store(&pool, "reg-2", StoreStatus::Pending).await;
    let second = insert_store(&pool, "reg-2", StoreStatus::Pending).await;
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_unknown_store_is_not_found(pool: sqlx::PgPool) {
    let err = get_store(&pool, "ghost").await.expect_err("should not exist");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_stores_filters_by_status(pool: sqlx::PgPool) {
    insert_store(&pool, "a", StoreStatus::Pending).await;
    insert_store(&pool, "b", StoreStatus::Active).await;
    insert_store(&pool, "c", StoreStatus::Pending).await;

    let pending = list_stores(&pool, Some(StoreStatus::Pending), 50)
        .await
        .expect("list failed");
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|r| r.status == "pending"));

    let all = list_stores(&pool, None, 2).await.expect("list failed");
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn status_update_keeps_reasons_it_does_not_set(pool: sqlx::PgPool) {
    let record = insert_store(&pool, "reg-3", StoreStatus::Pending).await;

    let rejected = update_store_status(
        &pool,
        &StatusWrite {
            rejection_reason: Some("blurry permit".to_string()),
            ..status_write(&record, StoreStatus::Rejected)
        },
    )
    .await
    .expect("reject failed")
    .into_record()
    .expect("row converts");
    assert_eq!(rejected.version, 2);

    let pending = update_store_status(&pool, &status_write(&rejected, StoreStatus::Pending))
        .await
        .expect("re-review failed");

    assert_eq!(pending.status, "pending");
    assert_eq!(pending.rejection_reason.as_deref(), Some("blurry permit"));
    assert_eq!(pending.version, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn status_update_with_stale_version_is_refused(pool: sqlx::PgPool) {
    let record = insert_store(&pool, "reg-4", StoreStatus::Pending).await;
    update_store_status(&pool, &status_write(&record, StoreStatus::Approved))
        .await
        .expect("first write failed");

    let err = update_store_status(&pool, &status_write(&record, StoreStatus::Rejected))
        .await
        .expect_err("stale write should fail");

    assert!(
        matches!(
            err,
            DbError::StaleStoreWrite {
                expected_status: "pending",
                expected_version: 1,
                ..
            }
        ),
        "expected StaleStoreWrite, got {err:?}"
    );
    let current = get_store(&pool, "reg-4").await.expect("get failed");
    assert_eq!(current.status, "approved");
}

#[sqlx::test(migrations = "../../migrations")]
async fn status_update_for_unknown_id_is_not_found(pool: sqlx::PgPool) {
    let ghost = StoreRecord::new("ghost");
    let err = update_store_status(&pool, &status_write(&ghost, StoreStatus::Approved))
        .await
        .expect_err("unknown id should fail");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_is_guarded_by_status(pool: sqlx::PgPool) {
    let record = insert_store(&pool, "store-1", StoreStatus::Suspended).await;

    let err = delete_store(&pool, "store-1", StoreStatus::Active, record.version)
        .await
        .expect_err("wrong status should fail");
    assert!(matches!(err, DbError::StaleStoreWrite { .. }));

    delete_store(&pool, "store-1", StoreStatus::Suspended, record.version)
        .await
        .expect("delete failed");
    assert!(matches!(
        get_store(&pool, "store-1").await,
        Err(DbError::NotFound)
    ));
}

// ---------------------------------------------------------------------------
// Section 2: Lifecycle engine over Postgres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn engine_suspend_and_reactivate(pool: sqlx::PgPool) {
    insert_store(&pool, "store-2", StoreStatus::Active).await;
    let engine = LifecycleEngine::new(PgRecordStore::new(pool.clone()));

    engine
        .apply(TransitionRequest::new("store-2", LifecycleAction::Suspend).with_reason("expired permit"))
        .await
        .expect("suspend failed");
    let outcome = engine
        .apply(TransitionRequest::new("store-2", LifecycleAction::Reactivate))
        .await
        .expect("reactivate failed");

    let record = outcome.record.expect("record after reactivate");
    assert_eq!(record.status, StoreStatus::Active);
    assert_eq!(record.status_reason.as_deref(), Some("expired permit"));
    assert_eq!(record.version, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn engine_reports_conflict_for_stale_caller(pool: sqlx::PgPool) {
    let record = insert_store(&pool, "reg-5", StoreStatus::Pending).await;
    let engine = LifecycleEngine::new(PgRecordStore::new(pool.clone()));

    engine
        .apply(TransitionRequest::new("reg-5", LifecycleAction::Approve).expecting_version(record.version))
        .await
        .expect("approve failed");

    let err = engine
        .apply(
            TransitionRequest::new("reg-5", LifecycleAction::Reject)
                .with_reason("duplicate")
                .expecting_version(record.version),
        )
        .await
        .expect_err("second admin should lose");
    assert!(matches!(err, LifecycleError::Conflict { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn engine_delete_removes_row(pool: sqlx::PgPool) {
    insert_store(&pool, "reg-6", StoreStatus::Rejected).await;
    let engine = LifecycleEngine::new(PgRecordStore::new(pool.clone()));

    engine
        .apply(TransitionRequest::new("reg-6", LifecycleAction::Delete))
        .await
        .expect("delete failed");

    assert!(matches!(get_store(&pool, "reg-6").await, Err(DbError::NotFound)));
}

// ---------------------------------------------------------------------------
// Section 3: Transactions and import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn transactions_feed_sales_summary(pool: sqlx::PgPool) {
    for (id, store, cents, status) in [
        ("tx-1", "store-a", 30_000, TransactionStatus::Completed),
        ("tx-2", "store-b", 10_000, TransactionStatus::Completed),
        ("tx-3", "store-b", 50_000, TransactionStatus::Refunded),
    ] {
        upsert_transaction(
            &pool,
            &TransactionRecord {
                id: id.to_string(),
                store_id: store.to_string(),
                amount: Decimal::new(cents, 2),
                status,
                created_at: None,
            },
        )
        .await
        .expect("upsert_transaction failed");
    }

    let records: Vec<_> = list_transactions(&pool)
        .await
        .expect("list failed")
        .into_iter()
        .map(|row| row.into_record().expect("row converts"))
        .collect();
    let summary = summarize_sales(&records);

    assert_eq!(summary.transaction_count, 2);
    assert_eq!(summary.grand_total, Decimal::new(40_000, 2));
    assert_eq!(summary.stores[0].store_id, "store-a");
    assert_eq!(summary.stores[0].share_percent, Decimal::from(75));
}

#[sqlx::test(migrations = "../../migrations")]
async fn import_export_writes_everything(pool: sqlx::PgPool) {
    let bundle = ExportBundle::from_json(
        r#"{
            "stores": {"store-1": {"status": "active", "storeName": "Nena's"}},
            "registrations": {"reg-1": {"ownerName": "Tonyo"}},
            "transactions": {"tx-1": {"storeId": "store-1", "amount": 99.5, "status": "completed"}}
        }"#,
    )
    .expect("export parses");

    let summary = import_export(&pool, &bundle).await.expect("import failed");
    assert_eq!(summary.stores, 2);
    assert_eq!(summary.transactions, 1);

    let store = get_store(&pool, "store-1").await.expect("get failed");
    assert_eq!(store.status, "active");
    assert_eq!(list_transactions(&pool).await.expect("list failed").len(), 1);
}

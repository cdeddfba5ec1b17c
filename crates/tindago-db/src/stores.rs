//! Database operations for the `stores` table.
//!
//! Status writes are guarded by both the status and the `version` the caller
//! read, so two admins acting on the same record cannot both win.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tindago_core::{Documents, StatusWrite, StoreRecord, StoreStatus};

use crate::DbError;

const STORE_COLUMNS: &str = "id, status, store_name, owner_name, owner_email, owner_phone, \
     address, business_category, description, documents, status_reason, rejection_reason, \
     version, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: String,
    pub status: String,
    pub store_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub address: Option<String>,
    pub business_category: Option<String>,
    pub description: Option<String>,
    pub documents: serde_json::Value,
    pub status_reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreRow {
    /// Convert into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidStoredValue`] if the stored status or
    /// documents column cannot be read.
    pub fn into_record(self) -> Result<StoreRecord, DbError> {
        let status = self
            .status
            .parse::<StoreStatus>()
            .map_err(|e| DbError::InvalidStoredValue {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;
        let documents: Documents =
            serde_json::from_value(self.documents).map_err(|e| DbError::InvalidStoredValue {
                id: self.id.clone(),
                reason: format!("documents: {e}"),
            })?;

        Ok(StoreRecord {
            id: self.id,
            status,
            store_name: self.store_name,
            owner_name: self.owner_name,
            owner_email: self.owner_email,
            owner_phone: self.owner_phone,
            address: self.address,
            business_category: self.business_category,
            description: self.description,
            documents,
            status_reason: self.status_reason,
            rejection_reason: self.rejection_reason,
            version: self.version,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetches a single store by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_store(pool: &PgPool, id: &str) -> Result<StoreRow, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Lists stores, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores(
    pool: &PgPool,
    status: Option<StoreStatus>,
    limit: i64,
) -> Result<Vec<StoreRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores \
         WHERE ($1::TEXT IS NULL OR status = $1) \
         ORDER BY created_at DESC, id ASC \
         LIMIT $2"
    ))
    .bind(status.map(StoreStatus::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts or replaces a store from an export. An existing row has its
/// version bumped so in-flight transitions computed against it are refused.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_store<'e, E>(executor: E, record: &StoreRecord) -> Result<StoreRow, DbError>
where
    E: PgExecutor<'e>,
{
    let documents = serde_json::to_value(&record.documents).map_err(|e| {
        DbError::InvalidStoredValue {
            id: record.id.clone(),
            reason: format!("documents: {e}"),
        }
    })?;

    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "INSERT INTO stores (id, status, store_name, owner_name, owner_email, owner_phone, \
             address, business_category, description, documents, status_reason, \
             rejection_reason, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
             COALESCE($13, NOW()), COALESCE($14, NOW())) \
         ON CONFLICT (id) DO UPDATE SET \
             status = EXCLUDED.status, \
             store_name = EXCLUDED.store_name, \
             owner_name = EXCLUDED.owner_name, \
             owner_email = EXCLUDED.owner_email, \
             owner_phone = EXCLUDED.owner_phone, \
             address = EXCLUDED.address, \
             business_category = EXCLUDED.business_category, \
             description = EXCLUDED.description, \
             documents = EXCLUDED.documents, \
             status_reason = EXCLUDED.status_reason, \
             rejection_reason = EXCLUDED.rejection_reason, \
             version = stores.version + 1, \
             updated_at = NOW() \
         RETURNING {STORE_COLUMNS}"
    ))
    .bind(&record.id)
    .bind(record.status.as_str())
    .bind(&record.store_name)
    .bind(&record.owner_name)
    .bind(&record.owner_email)
    .bind(&record.owner_phone)
    .bind(&record.address)
    .bind(&record.business_category)
    .bind(&record.description)
    .bind(documents)
    .bind(&record.status_reason)
    .bind(&record.rejection_reason)
    .bind(record.created_at)
    .bind(record.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Applies a lifecycle status write. Reasons are only ever set, never
/// cleared, so history survives re-review and reactivation.
///
/// # Errors
///
/// Returns [`DbError::StaleStoreWrite`] if the row no longer has the expected
/// status and version, [`DbError::NotFound`] if it does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_store_status(pool: &PgPool, write: &StatusWrite) -> Result<StoreRow, DbError> {
    let updated = sqlx::query_as::<_, StoreRow>(&format!(
        "UPDATE stores \
         SET status = $1, \
             status_reason = COALESCE($2, status_reason), \
             rejection_reason = COALESCE($3, rejection_reason), \
             version = version + 1, \
             updated_at = NOW() \
         WHERE id = $4 AND status = $5 AND version = $6 \
         RETURNING {STORE_COLUMNS}"
    ))
    .bind(write.new_status.as_str())
    .bind(&write.status_reason)
    .bind(&write.rejection_reason)
    .bind(&write.id)
    .bind(write.expected_status.as_str())
    .bind(write.expected_version)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(row) => Ok(row),
        None => Err(missing_or_stale(
            pool,
            &write.id,
            write.expected_status,
            write.expected_version,
        )
        .await),
    }
}

/// Deletes a store, guarded the same way as [`update_store_status`].
///
/// # Errors
///
/// Returns [`DbError::StaleStoreWrite`], [`DbError::NotFound`], or
/// [`DbError::Sqlx`].
pub async fn delete_store(
    pool: &PgPool,
    id: &str,
    expected_status: StoreStatus,
    expected_version: i64,
) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM stores WHERE id = $1 AND status = $2 AND version = $3")
        .bind(id)
        .bind(expected_status.as_str())
        .bind(expected_version)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(missing_or_stale(pool, id, expected_status, expected_version).await);
    }

    Ok(())
}

async fn missing_or_stale(
    pool: &PgPool,
    id: &str,
    expected_status: StoreStatus,
    expected_version: i64,
) -> DbError {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM stores WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await;

    match exists {
        Ok(true) => DbError::StaleStoreWrite {
            id: id.to_string(),
            expected_status: expected_status.as_str(),
            expected_version,
        },
        Ok(false) => DbError::NotFound,
        Err(e) => DbError::Sqlx(e),
    }
}

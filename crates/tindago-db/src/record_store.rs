//! Postgres-backed [`RecordStore`] for the lifecycle engine.

use sqlx::PgPool;
use tindago_core::{RecordStore, StatusWrite, StoreError, StoreRecord, StoreStatus};

use crate::{stores, DbError};

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl RecordStore for PgRecordStore {
    async fn fetch(&self, id: &str) -> Result<Option<StoreRecord>, StoreError> {
        match stores::get_store(&self.pool, id).await {
            Ok(row) => row.into_record().map(Some).map_err(into_store_error),
            Err(DbError::NotFound) => Ok(None),
            Err(e) => Err(into_store_error(e)),
        }
    }

    async fn write_status(&self, write: &StatusWrite) -> Result<StoreRecord, StoreError> {
        stores::update_store_status(&self.pool, write)
            .await
            .and_then(stores::StoreRow::into_record)
            .map_err(|e| match e {
                DbError::NotFound => StoreError::NotFound(write.id.clone()),
                other => into_store_error(other),
            })
    }

    async fn remove(
        &self,
        id: &str,
        expected_status: StoreStatus,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        stores::delete_store(&self.pool, id, expected_status, expected_version)
            .await
            .map_err(|e| match e {
                DbError::NotFound => StoreError::NotFound(id.to_string()),
                other => into_store_error(other),
            })
    }
}

fn into_store_error(error: DbError) -> StoreError {
    match error {
        DbError::StaleStoreWrite { id, .. } => StoreError::Conflict(id),
        other => StoreError::Backend(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_write_maps_to_conflict() {
        let err = into_store_error(DbError::StaleStoreWrite {
            id: "reg-1".to_string(),
            expected_status: "pending",
            expected_version: 3,
        });
        assert!(matches!(err, StoreError::Conflict(ref id) if id == "reg-1"));
    }

    #[test]
    fn other_errors_map_to_backend() {
        let err = into_store_error(DbError::InvalidStoredValue {
            id: "reg-1".to_string(),
            reason: "unknown status 'archived'".to_string(),
        });
        assert!(matches!(err, StoreError::Backend(_)));
    }
}

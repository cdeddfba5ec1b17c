//! Database operations for the `transactions` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tindago_core::{TransactionRecord, TransactionStatus};

use crate::DbError;

/// A row from the `transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: String,
    pub store_id: String,
    /// `NUMERIC(14, 2)` in the schema.
    pub amount: Decimal,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TransactionRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidStoredValue`] for a status outside the known set.
    pub fn into_record(self) -> Result<TransactionRecord, DbError> {
        let status = self
            .status
            .parse::<TransactionStatus>()
            .map_err(|reason| DbError::InvalidStoredValue {
                id: self.id.clone(),
                reason,
            })?;
        Ok(TransactionRecord {
            id: self.id,
            store_id: self.store_id,
            amount: self.amount,
            status,
            created_at: self.created_at,
        })
    }
}

/// Returns every transaction, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_transactions(pool: &PgPool) -> Result<Vec<TransactionRow>, DbError> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, store_id, amount, status, created_at \
         FROM transactions \
         ORDER BY created_at ASC NULLS LAST, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts or replaces one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_transaction<'e, E>(
    executor: E,
    transaction: &TransactionRecord,
) -> Result<(), DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO transactions (id, store_id, amount, status, created_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (id) DO UPDATE SET \
             store_id = EXCLUDED.store_id, \
             amount = EXCLUDED.amount, \
             status = EXCLUDED.status, \
             created_at = EXCLUDED.created_at",
    )
    .bind(&transaction.id)
    .bind(&transaction.store_id)
    .bind(transaction.amount)
    .bind(transaction.status.as_str())
    .bind(transaction.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

//! Sales reporting command handlers.

use clap::Subcommand;
use tindago_core::summarize_sales;

/// Sub-commands available under `analytics`.
#[derive(Debug, Subcommand)]
pub enum AnalyticsCommands {
    /// Completed sales per store with each store's share of the total
    Sales,
}

pub(crate) async fn run_analytics_sales(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rows = tindago_db::list_transactions(pool).await?;
    if rows.is_empty() {
        println!("no transactions found; run `stores import --file <export.json>` first");
        return Ok(());
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(transaction_id = %id, error = %e, "skipping unreadable transaction");
            }
        }
    }

    let summary = summarize_sales(&records);
    if summary.stores.is_empty() {
        println!("no completed transactions");
        return Ok(());
    }

    println!("{:<24}{:>8}{:>16}{:>9}", "STORE", "TXNS", "TOTAL", "SHARE");
    for store in &summary.stores {
        println!(
            "{:<24}{:>8}{:>16}{:>8}%",
            store.store_id, store.transaction_count, store.total, store.share_percent
        );
    }
    println!(
        "{:<24}{:>8}{:>16}",
        "ALL", summary.transaction_count, summary.grand_total
    );

    Ok(())
}

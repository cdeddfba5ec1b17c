use tindago_core::{RecordDetail, StoreStatus};

use super::{fmt_timestamp, truncate};

/// Print a table of stores, optionally filtered by status.
pub(crate) async fn run_stores_list(
    pool: &sqlx::PgPool,
    status: Option<StoreStatus>,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = tindago_db::list_stores(pool, status, limit.clamp(1, 200)).await?;

    if rows.is_empty() {
        match status {
            Some(s) => println!("no {s} stores found"),
            None => println!("no stores found; run `stores import --file <export.json>` first"),
        }
        return Ok(());
    }

    println!(
        "{:<22}{:<11}{:<28}{:<6}{:<5}{}",
        "ID", "STATUS", "NAME", "DOCS", "VER", "CREATED"
    );
    for row in rows {
        let id = row.id.clone();
        let record = match row.into_record() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(store_id = %id, error = %e, "skipping unreadable store row");
                continue;
            }
        };
        println!(
            "{:<22}{:<11}{:<28}{:<6}{:<5}{}",
            truncate(&record.id, 21),
            record.status,
            truncate(record.display_name(), 27),
            record.uploaded_documents().len(),
            record.version,
            fmt_timestamp(record.created_at),
        );
    }

    Ok(())
}

/// Print the detail view of one record.
pub(crate) async fn run_stores_show(pool: &sqlx::PgPool, id: &str) -> anyhow::Result<()> {
    let record = match tindago_db::get_store(pool, id).await {
        Ok(row) => row.into_record()?,
        Err(tindago_db::DbError::NotFound) => {
            println!("store '{id}' not found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let detail = RecordDetail::build(record, false);
    let record = &detail.record;

    println!("{}  ({})", record.display_name(), record.id);
    println!("  status:    {} (version {})", record.status, record.version);
    let fields = [
        ("owner", &record.owner_name),
        ("email", &record.owner_email),
        ("phone", &record.owner_phone),
        ("address", &record.address),
        ("category", &record.business_category),
        ("reason", &record.status_reason),
        ("rejected", &record.rejection_reason),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {:<11}{value}", format!("{label}:"));
        }
    }
    println!("  created:   {}", fmt_timestamp(record.created_at));

    println!();
    if detail.documents.is_empty() {
        println!("documents: none uploaded");
    } else {
        println!("documents:");
        for document in &detail.documents {
            let kind = if document.source.is_inline() {
                "inline"
            } else {
                "link"
            };
            println!(
                "  {:<30}{:<8}{}",
                document.display_name,
                kind,
                document.file_name.as_deref().unwrap_or("-"),
            );
        }
    }

    println!();
    println!("actions:");
    for control in &detail.actions {
        let marker = if control.enabled { "*" } else { " " };
        let reason = if control.requires_reason {
            " (reason required)"
        } else {
            ""
        };
        println!("  {marker} {:<12}{}{reason}", control.action, control.label);
    }

    Ok(())
}

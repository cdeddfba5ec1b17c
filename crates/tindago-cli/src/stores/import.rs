use std::path::Path;

use anyhow::Context;
use tindago_db::ExportBundle;

/// Load a JSON export and write its stores and transactions.
pub(crate) async fn run_stores_import(
    pool: &sqlx::PgPool,
    file: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let bundle = ExportBundle::from_json(&raw)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    for (id, reason) in &bundle.skipped {
        println!("  skipped {id}: {reason}");
    }

    if dry_run {
        println!(
            "[dry-run] would import {} store(s) and {} transaction(s); {} skipped",
            bundle.stores.len(),
            bundle.transactions.len(),
            bundle.skipped.len(),
        );
        return Ok(());
    }

    let summary = tindago_db::import_export(pool, &bundle).await?;
    println!(
        "imported {} store(s) and {} transaction(s); {} skipped",
        summary.stores, summary.transactions, summary.skipped,
    );
    Ok(())
}

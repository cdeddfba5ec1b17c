use anyhow::bail;
use tindago_core::{LifecycleAction, LifecycleEngine, LifecycleError, TransitionRequest};
use tindago_db::PgRecordStore;

pub(crate) struct TransitionArgs {
    pub id: String,
    pub action: LifecycleAction,
    pub reason: Option<String>,
    pub expected_version: Option<i64>,
    pub confirmed: bool,
}

/// Apply one lifecycle action through the engine and report the result.
pub(crate) async fn run_stores_transition(
    pool: &sqlx::PgPool,
    args: TransitionArgs,
) -> anyhow::Result<()> {
    if args.action.is_irreversible() && !args.confirmed {
        bail!(
            "{} cannot be undone; re-run with --yes to confirm",
            args.action.label()
        );
    }

    let engine = LifecycleEngine::new(PgRecordStore::new(pool.clone()));
    let mut request = TransitionRequest::new(args.id, args.action);
    if let Some(reason) = args.reason {
        request = request.with_reason(reason);
    }
    if let Some(version) = args.expected_version {
        request = request.expecting_version(version);
    }

    match engine.apply(request).await {
        Ok(outcome) => {
            match &outcome.record {
                Some(record) => println!(
                    "{}: {} -> {} (version {})",
                    outcome.id, outcome.from, outcome.to, record.version
                ),
                None => println!("{}: {} -> {}", outcome.id, outcome.from, outcome.to),
            }
            Ok(())
        }
        Err(LifecycleError::Store(e)) => {
            tracing::error!(error = %e, "transition write failed");
            bail!("the record could not be updated; it was left unchanged, try again")
        }
        Err(e) => Err(e.into()),
    }
}

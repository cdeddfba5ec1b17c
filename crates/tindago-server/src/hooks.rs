use tindago_core::LifecycleHooks;

/// Writes one structured log line per applied transition. The reason text is
/// the only audit trail the records themselves keep, so it goes in the log too.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogHooks;

impl LifecycleHooks for AuditLogHooks {
    fn on_approve(&self, id: &str) {
        tracing::info!(target: "audit", id, action = "approve", "registration approved");
    }

    fn on_reject(&self, id: &str, reason: &str) {
        tracing::info!(target: "audit", id, action = "reject", reason, "registration rejected");
    }

    fn on_re_review(&self, id: &str) {
        tracing::info!(target: "audit", id, action = "re_review", "registration returned to review");
    }

    fn on_suspend(&self, id: &str, reason: &str) {
        tracing::info!(target: "audit", id, action = "suspend", reason, "store suspended");
    }

    fn on_reactivate(&self, id: &str) {
        tracing::info!(target: "audit", id, action = "reactivate", "store reactivated");
    }

    fn on_delete(&self, id: &str) {
        tracing::warn!(target: "audit", id, action = "delete", "record deleted");
    }
}

//! Admin-triggered status transitions against an external record store.
//!
//! Each transition is one guarded write. The engine checks the transition
//! table, requires a reason for negative actions, keeps at most one write in
//! flight per record, and passes the record's `version` to the store so a
//! stale write from another session is refused instead of silently winning.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;

use crate::records::StoreRecord;
use crate::status::{LifecycleAction, StoreStatus, TransitionTarget};
use crate::CoreError;

// ---------------------------------------------------------------------------
// Record store seam
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record '{0}' not found")]
    NotFound(String),
    /// The record changed (status or version) between read and write.
    #[error("record '{0}' was modified by another session")]
    Conflict(String),
    #[error("record store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// One status write, guarded by the status and version it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWrite {
    pub id: String,
    pub expected_status: StoreStatus,
    pub expected_version: i64,
    pub new_status: StoreStatus,
    /// Written to `status_reason` when present; never clears it.
    pub status_reason: Option<String>,
    /// Written to `rejection_reason` when present; never clears it.
    pub rejection_reason: Option<String>,
}

/// Where records live. The dashboard never creates records through this
/// seam; it reads them and applies lifecycle writes.
pub trait RecordStore: Send + Sync {
    fn fetch(&self, id: &str) -> impl Future<Output = Result<Option<StoreRecord>, StoreError>> + Send;

    /// Apply `write` only if the record still has the expected status and
    /// version. Returns the updated record.
    fn write_status(
        &self,
        write: &StatusWrite,
    ) -> impl Future<Output = Result<StoreRecord, StoreError>> + Send;

    /// Remove the record only if it still has the expected status and version.
    fn remove(
        &self,
        id: &str,
        expected_status: StoreStatus,
        expected_version: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Callbacks fired after a transition has been written. Callers use them to
/// navigate away or refresh their lists.
pub trait LifecycleHooks: Send + Sync {
    fn on_approve(&self, _id: &str) {}
    fn on_reject(&self, _id: &str, _reason: &str) {}
    fn on_re_review(&self, _id: &str) {}
    fn on_suspend(&self, _id: &str, _reason: &str) {}
    fn on_reactivate(&self, _id: &str) {}
    fn on_delete(&self, _id: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub id: String,
    pub action: LifecycleAction,
    pub reason: Option<String>,
    /// Version the caller last saw. When set, a newer record is a conflict
    /// even if the transition would still be legal.
    pub expected_version: Option<i64>,
}

impl TransitionRequest {
    #[must_use]
    pub fn new(id: impl Into<String>, action: LifecycleAction) -> Self {
        Self {
            id: id.into(),
            action,
            reason: None,
            expected_version: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn expecting_version(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub id: String,
    pub action: LifecycleAction,
    pub from: StoreStatus,
    pub to: TransitionTarget,
    /// The record after the write; `None` once deleted.
    pub record: Option<StoreRecord>,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("record '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    IllegalTransition(#[from] CoreError),
    #[error("a reason is required to {0}")]
    ReasonRequired(LifecycleAction),
    #[error("another transition on '{0}' is still in progress")]
    Busy(String),
    #[error("record '{id}' changed since version {expected}; reload and try again")]
    Conflict { id: String, expected: i64 },
    #[error(transparent)]
    Store(StoreError),
}

/// Applies lifecycle transitions through a [`RecordStore`].
pub struct LifecycleEngine<S, H = NoopHooks> {
    store: S,
    hooks: H,
    in_flight: Mutex<HashSet<String>>,
}

impl<S: RecordStore> LifecycleEngine<S, NoopHooks> {
    pub fn new(store: S) -> Self {
        Self::with_hooks(store, NoopHooks)
    }
}

impl<S: RecordStore, H: LifecycleHooks> LifecycleEngine<S, H> {
    pub fn with_hooks(store: S, hooks: H) -> Self {
        Self {
            store,
            hooks,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns `true` while a transition on `id` is outstanding.
    pub fn is_processing(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Apply one transition.
    ///
    /// Nothing is written unless every check passes; on any failure the
    /// record keeps its current state and the caller may retry.
    ///
    /// # Errors
    ///
    /// See [`LifecycleError`] for the individual failure cases.
    pub async fn apply(
        &self,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let TransitionRequest {
            id,
            action,
            reason,
            expected_version,
        } = request;

        let _guard = InFlightGuard::acquire(&self.in_flight, &id)
            .ok_or_else(|| LifecycleError::Busy(id.clone()))?;

        let record = self
            .store
            .fetch(&id)
            .await
            .map_err(|e| log_store_failure(&id, action, e))?
            .ok_or_else(|| LifecycleError::NotFound(id.clone()))?;

        if let Some(expected) = expected_version {
            if expected != record.version {
                tracing::warn!(
                    id = %id,
                    %action,
                    expected,
                    actual = record.version,
                    "refusing transition on stale version"
                );
                return Err(LifecycleError::Conflict { id, expected });
            }
        }

        let from = record.status;
        let to = from.apply(action)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if action.requires_reason() && reason.is_none() {
            return Err(LifecycleError::ReasonRequired(action));
        }

        let updated = match to {
            TransitionTarget::Deleted => {
                self.store
                    .remove(&id, from, record.version)
                    .await
                    .map_err(|e| conflict_or_failure(&id, action, record.version, e))?;
                None
            }
            TransitionTarget::Status(new_status) => {
                let write = StatusWrite {
                    id: id.clone(),
                    expected_status: from,
                    expected_version: record.version,
                    new_status,
                    status_reason: (action == LifecycleAction::Suspend)
                        .then(|| reason.clone())
                        .flatten(),
                    rejection_reason: (action == LifecycleAction::Reject)
                        .then(|| reason.clone())
                        .flatten(),
                };
                let updated = self
                    .store
                    .write_status(&write)
                    .await
                    .map_err(|e| conflict_or_failure(&id, action, record.version, e))?;
                Some(updated)
            }
        };

        tracing::info!(id = %id, %action, %from, %to, "lifecycle transition applied");
        self.notify(action, &id, reason.as_deref().unwrap_or_default());

        Ok(TransitionOutcome {
            id,
            action,
            from,
            to,
            record: updated,
        })
    }

    fn notify(&self, action: LifecycleAction, id: &str, reason: &str) {
        match action {
            LifecycleAction::Approve => self.hooks.on_approve(id),
            LifecycleAction::Reject => self.hooks.on_reject(id, reason),
            LifecycleAction::ReReview => self.hooks.on_re_review(id),
            LifecycleAction::Suspend => self.hooks.on_suspend(id, reason),
            LifecycleAction::Reactivate => self.hooks.on_reactivate(id),
            LifecycleAction::Delete => self.hooks.on_delete(id),
        }
    }
}

fn log_store_failure(id: &str, action: LifecycleAction, error: StoreError) -> LifecycleError {
    tracing::error!(id, %action, error = %error, "record store call failed");
    match error {
        StoreError::NotFound(id) => LifecycleError::NotFound(id),
        other => LifecycleError::Store(other),
    }
}

fn conflict_or_failure(
    id: &str,
    action: LifecycleAction,
    expected: i64,
    error: StoreError,
) -> LifecycleError {
    match error {
        StoreError::Conflict(_) => {
            tracing::warn!(id, %action, expected, "transition lost a concurrent write");
            LifecycleError::Conflict {
                id: id.to_string(),
                expected,
            }
        }
        other => log_store_failure(id, action, other),
    }
}

/// Marks a record id as busy for as long as the guard lives.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, id: &str) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string());
        inserted.then(|| Self {
            set,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;

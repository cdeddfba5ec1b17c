//! Store/registration status values and the admin transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Persisted status of a registration or store record.
///
/// `Approved` is what a reviewed registration carries; `Active` is what the
/// store side writes after a reactivation. Both mean the store is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Suspended,
}

impl StoreStatus {
    pub const ALL: [StoreStatus; 5] = [
        StoreStatus::Pending,
        StoreStatus::Approved,
        StoreStatus::Rejected,
        StoreStatus::Active,
        StoreStatus::Suspended,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreStatus::Pending => "pending",
            StoreStatus::Approved => "approved",
            StoreStatus::Rejected => "rejected",
            StoreStatus::Active => "active",
            StoreStatus::Suspended => "suspended",
        }
    }

    /// Looks up `action` in the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalTransition`] when the table has no row for
    /// this status and action.
    pub fn apply(self, action: LifecycleAction) -> Result<TransitionTarget, CoreError> {
        use LifecycleAction as A;
        use StoreStatus as S;

        let target = match (self, action) {
            (S::Pending, A::Approve) => TransitionTarget::Status(S::Approved),
            (S::Pending, A::Reject) => TransitionTarget::Status(S::Rejected),
            (S::Rejected, A::ReReview) => TransitionTarget::Status(S::Pending),
            (S::Active | S::Approved, A::Suspend) => TransitionTarget::Status(S::Suspended),
            (S::Suspended, A::Reactivate) => TransitionTarget::Status(S::Active),
            (S::Rejected | S::Suspended, A::Delete) => TransitionTarget::Deleted,
            (from, action) => return Err(CoreError::IllegalTransition { from, action }),
        };
        Ok(target)
    }

    /// Returns `true` if `action` has a row in the transition table for this status.
    #[must_use]
    pub fn allows(self, action: LifecycleAction) -> bool {
        self.apply(action).is_ok()
    }

    /// Actions with a legal transition out of this status, in display order.
    #[must_use]
    pub fn available_actions(self) -> Vec<LifecycleAction> {
        LifecycleAction::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(StoreStatus::Pending),
            "approved" => Ok(StoreStatus::Approved),
            "rejected" => Ok(StoreStatus::Rejected),
            "active" => Ok(StoreStatus::Active),
            "suspended" => Ok(StoreStatus::Suspended),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

/// Where a transition leaves the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    Status(StoreStatus),
    /// Terminal: the record is removed from the store.
    Deleted,
}

impl fmt::Display for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionTarget::Status(status) => status.fmt(f),
            TransitionTarget::Deleted => f.write_str("deleted"),
        }
    }
}

impl Serialize for TransitionTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Admin-triggered lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Approve,
    Reject,
    #[serde(alias = "re-review", alias = "rereview")]
    ReReview,
    Suspend,
    Reactivate,
    Delete,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 6] = [
        LifecycleAction::Approve,
        LifecycleAction::Reject,
        LifecycleAction::ReReview,
        LifecycleAction::Suspend,
        LifecycleAction::Reactivate,
        LifecycleAction::Delete,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
            LifecycleAction::ReReview => "re_review",
            LifecycleAction::Suspend => "suspend",
            LifecycleAction::Reactivate => "reactivate",
            LifecycleAction::Delete => "delete",
        }
    }

    /// Button label shown while the action is available.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LifecycleAction::Approve => "Approve",
            LifecycleAction::Reject => "Reject",
            LifecycleAction::ReReview => "Re-review",
            LifecycleAction::Suspend => "Suspend",
            LifecycleAction::Reactivate => "Reactivate",
            LifecycleAction::Delete => "Delete",
        }
    }

    /// Negative transitions must carry a free-text reason from the admin.
    #[must_use]
    pub fn requires_reason(self) -> bool {
        matches!(self, LifecycleAction::Reject | LifecycleAction::Suspend)
    }

    /// Delete removes the record and cannot be undone.
    #[must_use]
    pub fn is_irreversible(self) -> bool {
        matches!(self, LifecycleAction::Delete)
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(LifecycleAction::Approve),
            "reject" => Ok(LifecycleAction::Reject),
            "re_review" | "re-review" | "rereview" => Ok(LifecycleAction::ReReview),
            "suspend" => Ok(LifecycleAction::Suspend),
            "reactivate" => Ok(LifecycleAction::Reactivate),
            "delete" => Ok(LifecycleAction::Delete),
            _ => Err(CoreError::UnknownAction(s.to_string())),
        }
    }
}

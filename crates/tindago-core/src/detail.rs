//! One detail view for every status: record, documents, and action controls.

use serde::Serialize;

use crate::documents::{section_height, UploadedDocument};
use crate::records::StoreRecord;
use crate::status::{LifecycleAction, StoreStatus};

/// A lifecycle button as the detail view renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionControl {
    pub action: LifecycleAction,
    pub enabled: bool,
    pub label: String,
    pub requires_reason: bool,
    /// Delete asks for confirmation before it is sent.
    pub confirm: bool,
}

impl ActionControl {
    fn for_record(action: LifecycleAction, status: StoreStatus, processing: bool) -> Self {
        let legal = status.allows(action);
        let label = match settled_label(action, status) {
            Some(label) if !legal => label.to_string(),
            _ if legal && processing => "Processing...".to_string(),
            _ => action.label().to_string(),
        };
        Self {
            action,
            enabled: legal && !processing,
            label,
            requires_reason: action.requires_reason(),
            confirm: action.is_irreversible(),
        }
    }
}

/// Label for an action whose result the record already has.
fn settled_label(action: LifecycleAction, status: StoreStatus) -> Option<&'static str> {
    match (action, status) {
        (LifecycleAction::Approve, StoreStatus::Approved) => Some("Already Approved"),
        (LifecycleAction::Reject, StoreStatus::Rejected) => Some("Already Rejected"),
        (LifecycleAction::Suspend, StoreStatus::Suspended) => Some("Already Suspended"),
        (LifecycleAction::Reactivate, StoreStatus::Active) => Some("Already Active"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDetail {
    pub record: StoreRecord,
    pub documents: Vec<UploadedDocument>,
    pub section_height: u32,
    pub actions: Vec<ActionControl>,
}

impl RecordDetail {
    /// Build the view. `processing` is whether a transition on this record is
    /// in flight; every control is disabled while it is.
    #[must_use]
    pub fn build(record: StoreRecord, processing: bool) -> Self {
        let documents = record.uploaded_documents();
        let section_height = section_height(documents.len());
        let actions = LifecycleAction::ALL
            .into_iter()
            .map(|action| ActionControl::for_record(action, record.status, processing))
            .collect();
        Self {
            record,
            documents,
            section_height,
            actions,
        }
    }

    #[must_use]
    pub fn control(&self, action: LifecycleAction) -> Option<&ActionControl> {
        self.actions.iter().find(|c| c.action == action)
    }
}

//! Uploaded registration documents: presence checks, ordering, and opening.
//!
//! Records carry their documents under a free-form `documents` map whose
//! values may be in any of the shapes described on [`DocumentEntry`]. The
//! functions here reduce that map to the ordered list of documents an admin
//! can actually open.

mod blob;
mod data_url;
mod entry;
mod viewer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use blob::{convert_base64_to_blob, BlobHandle, BlobRegistry};
pub use data_url::{decode_data_url, DecodedDocument, DEFAULT_MIME_TYPE};
pub use entry::{DocumentEntry, DocumentSource, HostedDocument, LegacyDocument};
pub use viewer::{open_document, DocumentViewer, ViewDocumentError, ViewerError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("data URL has no ',' between header and payload")]
    MissingSeparator,
    #[error("data URL payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Recognized document kinds, in the order the review screen lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    BusinessPermit,
    ValidId,
    BarangayBusinessClearance,
    DtiRegistration,
}

impl DocumentKind {
    pub const CATALOG: [DocumentKind; 4] = [
        DocumentKind::BusinessPermit,
        DocumentKind::ValidId,
        DocumentKind::BarangayBusinessClearance,
        DocumentKind::DtiRegistration,
    ];

    /// Key under which the mobile app stores this document.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            DocumentKind::BusinessPermit => "businessPermit",
            DocumentKind::ValidId => "validId",
            DocumentKind::BarangayBusinessClearance => "barangayBusinessClearance",
            DocumentKind::DtiRegistration => "dtiRegistration",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            DocumentKind::BusinessPermit => "Business Permit",
            DocumentKind::ValidId => "Valid ID",
            DocumentKind::BarangayBusinessClearance => "Barangay Business Clearance",
            DocumentKind::DtiRegistration => "DTI Registration",
        }
    }

    /// Informational only: a missing required document is omitted from the
    /// list like any other, never reported as an error.
    #[must_use]
    pub fn required(self) -> bool {
        !matches!(self, DocumentKind::DtiRegistration)
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::CATALOG.into_iter().find(|kind| kind.key() == key)
    }
}

// ---------------------------------------------------------------------------
// Document map
// ---------------------------------------------------------------------------

static ABSENT: DocumentEntry = DocumentEntry::Absent;

/// A record's raw `documents` map. Keys outside the catalog are kept so the
/// map can be written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Documents(BTreeMap<String, DocumentEntry>);

impl Documents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: DocumentKind, entry: DocumentEntry) {
        self.0.insert(kind.key().to_string(), entry);
    }

    /// Entry for `kind`; a missing key reads as [`DocumentEntry::Absent`].
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> &DocumentEntry {
        self.0.get(kind.key()).unwrap_or(&ABSENT)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(DocumentKind, DocumentEntry)> for Documents {
    fn from_iter<I: IntoIterator<Item = (DocumentKind, DocumentEntry)>>(iter: I) -> Self {
        let mut documents = Documents::new();
        for (kind, entry) in iter {
            documents.insert(kind, entry);
        }
        documents
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A catalog document that is actually present on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedDocument {
    pub kind: DocumentKind,
    pub display_name: &'static str,
    pub file_name: Option<String>,
    pub source: DocumentSource,
}

/// Returns `true` if `entry` holds a non-blank `url`, `uri`, or data string.
#[must_use]
pub fn has_valid_uri(entry: &DocumentEntry) -> bool {
    entry.is_uploaded()
}

/// Resolve an entry to where it can be opened from, preferring a hosted URL.
///
/// Returns `None` when nothing openable is stored; callers must not open an
/// empty target.
#[must_use]
pub fn resolve_document_url(entry: &DocumentEntry) -> Option<DocumentSource> {
    entry.resolve()
}

/// Present documents in catalog order. Absent entries are filtered out; the
/// remaining ones are never reordered.
#[must_use]
pub fn uploaded_documents(documents: &Documents) -> Vec<UploadedDocument> {
    DocumentKind::CATALOG
        .into_iter()
        .filter_map(|kind| {
            let entry = documents.get(kind);
            if !has_valid_uri(entry) {
                return None;
            }
            let source = resolve_document_url(entry)?;
            Some(UploadedDocument {
                kind,
                display_name: kind.display_name(),
                file_name: entry.file_name().map(str::to_string),
                source,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub const SECTION_MIN_HEIGHT: u32 = 140;
const SECTION_HEADER: u32 = 40;
const DOCUMENT_ROW_HEIGHT: u32 = 50;
const SECTION_FOOTER: u32 = 20;

/// Vertical space reserved for the document list so the action buttons
/// stacked below it never overlap.
#[must_use]
pub fn section_height(document_count: usize) -> u32 {
    if document_count == 0 {
        return SECTION_MIN_HEIGHT;
    }
    let rows = u32::try_from(document_count).unwrap_or(u32::MAX);
    SECTION_HEADER
        .saturating_add(rows.saturating_mul(DOCUMENT_ROW_HEIGHT))
        .saturating_add(SECTION_FOOTER)
        .max(SECTION_MIN_HEIGHT)
}

#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;

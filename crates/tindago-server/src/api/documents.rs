//! Opening registration documents over HTTP.
//!
//! Hosted and direct URLs are answered with a temporary redirect. Inline data
//! URLs are decoded into the blob registry and the client is sent to the
//! short-lived blob endpoint instead.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use tindago_core::{
    convert_base64_to_blob, open_document, BlobHandle, BlobRegistry, DocumentError, DocumentKind,
    DocumentViewer, ViewDocumentError, ViewerError,
};

use crate::middleware::RequestId;

use super::{stores::load_record, ApiError, AppState};

/// Viewer for HTTP clients: decoding goes to the shared registry and opening
/// is left to the redirect, so it never fails.
struct RedirectViewer<'a> {
    blobs: &'a BlobRegistry,
}

impl DocumentViewer for RedirectViewer<'_> {
    fn decode(&self, data_url: &str) -> Result<BlobHandle, DocumentError> {
        convert_base64_to_blob(self.blobs, data_url)
    }

    fn open(&self, _target: &str) -> Result<(), ViewerError> {
        Ok(())
    }
}

fn blob_location(handle: BlobHandle) -> String {
    format!("/api/v1/blobs/{}", handle.id())
}

pub(super) async fn open_store_document(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, key)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    let kind = DocumentKind::from_key(&key).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("unknown document key '{key}'"),
        )
    })?;

    let record = load_record(&state, &req_id, &id).await?;
    let document = record
        .uploaded_documents()
        .into_iter()
        .find(|d| d.kind == kind)
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("{} has not been uploaded", kind.display_name()),
            )
        })?;

    let viewer = RedirectViewer {
        blobs: &state.blobs,
    };
    let target = open_document(&viewer, &document).map_err(|e| match e {
        ViewDocumentError::Decode { .. } => {
            ApiError::new(req_id.0.clone(), "unprocessable_document", e.to_string())
        }
        ViewDocumentError::NothingToOpen { .. } => {
            ApiError::new(req_id.0.clone(), "not_found", e.to_string())
        }
        ViewDocumentError::Viewer { .. } => {
            tracing::error!(error = %e, "document viewer failed");
            ApiError::new(req_id.0.clone(), "internal_error", e.to_string())
        }
    })?;

    if document.source.is_inline() {
        let handle = BlobHandle::parse(&target).ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "internal_error", "blob handle was not issued")
        })?;
        return Ok(Redirect::to(&blob_location(handle)));
    }
    Ok(Redirect::temporary(&target))
}

pub(super) async fn get_blob(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(handle): Path<String>,
) -> Result<Response, ApiError> {
    let handle = BlobHandle::parse(&handle).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("'{handle}' is not a blob handle"),
        )
    })?;
    let blob = state.blobs.get(handle).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            "blob has expired or was never issued",
        )
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, blob.mime_type.clone()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        blob.bytes.clone(),
    )
        .into_response())
}

use thiserror::Error;

use super::{BlobHandle, DocumentError, DocumentSource, UploadedDocument};

/// Capability to turn document sources into something a person can look at.
///
/// The HTTP server answers with redirects, the CLI hands targets to the system
/// browser, and tests substitute an in-memory fake.
pub trait DocumentViewer {
    /// Decode an inline `data:` URL into a locally openable handle.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the data URL is malformed.
    fn decode(&self, data_url: &str) -> Result<BlobHandle, DocumentError>;

    /// Open a URL or blob handle.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Blocked`] when the environment refuses to open a
    /// new window, or [`ViewerError::Failed`] for any other launch failure.
    fn open(&self, target: &str) -> Result<(), ViewerError>;
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("opening {target} was blocked; allow pop-ups for this site and try again")]
    Blocked { target: String },
    #[error("failed to open {target}: {reason}")]
    Failed { target: String, reason: String },
}

/// Failure to view one document. The message names the document so it can be
/// shown to the admin as-is; other documents in the list are unaffected.
#[derive(Debug, Error)]
pub enum ViewDocumentError {
    #[error("{document} has no file to open")]
    NothingToOpen { document: &'static str },
    #[error("could not open {document}: {source}")]
    Decode {
        document: &'static str,
        #[source]
        source: DocumentError,
    },
    #[error("could not open {document}: {source}")]
    Viewer {
        document: &'static str,
        #[source]
        source: ViewerError,
    },
}

/// Open one uploaded document through `viewer`, decoding inline data first.
///
/// Returns the target that was opened: the hosted or direct URL, or the blob
/// handle an inline document was decoded into.
///
/// # Errors
///
/// Returns [`ViewDocumentError`] naming the document when decoding or opening fails.
pub fn open_document<V>(viewer: &V, document: &UploadedDocument) -> Result<String, ViewDocumentError>
where
    V: DocumentViewer + ?Sized,
{
    let name = document.display_name;

    let target = match &document.source {
        DocumentSource::Inline(data_url) => viewer
            .decode(data_url)
            .map_err(|source| {
                tracing::warn!(document = name, error = %source, "document decode failed");
                ViewDocumentError::Decode {
                    document: name,
                    source,
                }
            })?
            .to_string(),
        DocumentSource::Hosted(url) | DocumentSource::Direct(url) => url.clone(),
    };

    if target.trim().is_empty() {
        return Err(ViewDocumentError::NothingToOpen { document: name });
    }

    viewer.open(&target).map_err(|source| {
        tracing::warn!(document = name, error = %source, "document viewer refused to open");
        ViewDocumentError::Viewer {
            document: name,
            source,
        }
    })?;

    tracing::debug!(document = name, inline = document.source.is_inline(), "document opened");
    Ok(target)
}

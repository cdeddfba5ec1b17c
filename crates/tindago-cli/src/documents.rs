//! Opening registration documents in the system browser.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use clap::Subcommand;
use tempfile::TempPath;
use tindago_core::{
    convert_base64_to_blob, open_document, AppConfig, BlobHandle, BlobRegistry, DocumentError,
    DocumentKind, DocumentViewer, ViewerError,
};

/// Upper bound on how long decoded files stay on disk for the browser to load.
const SPILL_GRACE: Duration = Duration::from_secs(10);

/// Sub-commands available under `documents`.
#[derive(Debug, Subcommand)]
pub enum DocumentsCommands {
    /// Open a record's uploaded documents
    Open {
        /// Store or registration id
        id: String,
        /// Document key (businessPermit, validId, barangayBusinessClearance,
        /// dtiRegistration); opens every uploaded document when omitted
        key: Option<String>,
    },
}

/// Viewer that hands URLs to the default browser. Inline documents are
/// decoded into the registry and written to a private temp file first.
///
/// Temp files are removed when the viewer is dropped.
struct BrowserViewer {
    blobs: BlobRegistry,
    spilled: Mutex<Vec<TempPath>>,
}

impl BrowserViewer {
    fn new(ttl: Duration) -> Self {
        Self {
            blobs: BlobRegistry::new(ttl),
            spilled: Mutex::new(Vec::new()),
        }
    }

    fn spilled_count(&self) -> usize {
        self.spilled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Writes the blob to a temp file and releases the in-memory copy.
    fn spill_to_temp_file(&self, handle: BlobHandle) -> Result<PathBuf, ViewerError> {
        let target = handle.to_string();
        let failed = |reason: String| ViewerError::Failed {
            target: target.clone(),
            reason,
        };
        let blob = self
            .blobs
            .get(handle)
            .ok_or_else(|| failed("decoded document expired before it was opened".to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("tindago-")
            .suffix(&format!(".{}", file_extension(&blob.mime_type)))
            .tempfile()
            .map_err(|e| failed(e.to_string()))?;
        file.write_all(&blob.bytes)
            .and_then(|()| file.flush())
            .map_err(|e| failed(e.to_string()))?;
        self.blobs.revoke(handle);

        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        self.spilled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(temp_path);
        tracing::debug!(path = %path.display(), "decoded document written to temp file");
        Ok(path)
    }
}

impl DocumentViewer for BrowserViewer {
    fn decode(&self, data_url: &str) -> Result<BlobHandle, DocumentError> {
        convert_base64_to_blob(&self.blobs, data_url)
    }

    fn open(&self, target: &str) -> Result<(), ViewerError> {
        let location = match BlobHandle::parse(target) {
            Some(handle) => self.spill_to_temp_file(handle)?.display().to_string(),
            None => target.to_string(),
        };

        webbrowser::open(&location).map_err(|e| ViewerError::Failed {
            target: target.to_string(),
            reason: e.to_string(),
        })
    }
}

fn file_extension(mime_type: &str) -> &str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "application/pdf" => "pdf",
        other => other
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin"),
    }
}

/// Open one document, or all of a record's documents when `key` is `None`.
///
/// A document that fails to open is reported and the rest are still opened.
pub(crate) async fn run_documents_open(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    id: &str,
    key: Option<&str>,
) -> anyhow::Result<()> {
    let kind = key
        .map(|k| {
            DocumentKind::from_key(k).ok_or_else(|| anyhow::anyhow!("unknown document key '{k}'"))
        })
        .transpose()?;

    let record = match tindago_db::get_store(pool, id).await {
        Ok(row) => row.into_record()?,
        Err(tindago_db::DbError::NotFound) => {
            println!("store '{id}' not found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let documents: Vec<_> = record
        .uploaded_documents()
        .into_iter()
        .filter(|d| kind.is_none_or(|k| d.kind == k))
        .collect();
    if documents.is_empty() {
        match kind {
            Some(k) => println!("{} has not been uploaded", k.display_name()),
            None => println!("{} has no uploaded documents", record.display_name()),
        }
        return Ok(());
    }

    let viewer = BrowserViewer::new(Duration::from_secs(config.blob_ttl_secs));
    let mut failures = 0usize;
    for document in &documents {
        match open_document(&viewer, document) {
            Ok(_) => println!("opened {}", document.display_name),
            Err(e) => {
                failures += 1;
                println!("{e}");
            }
        }
    }

    let spilled = viewer.spilled_count();
    if spilled > 0 {
        let grace = Duration::from_secs(config.blob_ttl_secs).min(SPILL_GRACE);
        println!(
            "removing {spilled} decoded file(s) in {}s; press Ctrl-C to remove them now",
            grace.as_secs()
        );
        tokio::select! {
            () = tokio::time::sleep(grace) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    drop(viewer);

    if failures == documents.len() {
        anyhow::bail!("no documents could be opened");
    }
    Ok(())
}

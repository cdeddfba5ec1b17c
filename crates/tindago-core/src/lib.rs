pub mod analytics;
pub mod app_config;
pub mod config;
pub mod detail;
pub mod documents;
pub mod lifecycle;
pub mod records;
pub mod status;

pub use analytics::{summarize_sales, SalesSummary, StoreSales, TransactionRecord, TransactionStatus};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use detail::{ActionControl, RecordDetail};
pub use documents::{
    convert_base64_to_blob, decode_data_url, has_valid_uri, open_document, resolve_document_url,
    section_height, uploaded_documents, BlobHandle, BlobRegistry, DecodedDocument, DocumentEntry,
    DocumentError, DocumentKind, DocumentSource, DocumentViewer, Documents, UploadedDocument,
    ViewDocumentError, ViewerError,
};
pub use lifecycle::{
    LifecycleEngine, LifecycleError, LifecycleHooks, NoopHooks, RecordStore, StatusWrite,
    StoreError, TransitionOutcome, TransitionRequest,
};
pub use records::{RawStoreRecord, StoreRecord};
pub use status::{LifecycleAction, StoreStatus, TransitionTarget};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("unknown lifecycle action: {0}")]
    UnknownAction(String),
    #[error("cannot {action} a record that is {from}")]
    IllegalTransition {
        from: StoreStatus,
        action: LifecycleAction,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

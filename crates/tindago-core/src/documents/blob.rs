use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::data_url::{decode_data_url, DecodedDocument};
use super::DocumentError;

const HANDLE_PREFIX: &str = "blob:tindago/";

/// Process-local reference to decoded document bytes held by a [`BlobRegistry`].
///
/// Handles are only meaningful inside the process that issued them and stop
/// resolving once the registry's TTL elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobHandle(Uuid);

impl BlobHandle {
    #[must_use]
    pub fn id(self) -> Uuid {
        self.0
    }

    /// Parses either a bare UUID or a `blob:tindago/<uuid>` URL.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let id = raw.strip_prefix(HANDLE_PREFIX).unwrap_or(raw);
        Uuid::parse_str(id).ok().map(BlobHandle)
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HANDLE_PREFIX}{}", self.0)
    }
}

struct StoredBlob {
    expires_at: Instant,
    document: Arc<DecodedDocument>,
}

/// Time-bounded in-memory store for decoded documents.
///
/// Expired entries are dropped lazily: on lookup, and in bulk on every insert.
pub struct BlobRegistry {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, StoredBlob>>,
}

impl BlobRegistry {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, document: DecodedDocument) -> BlobHandle {
        let now = Instant::now();
        let id = Uuid::new_v4();
        let mut entries = self.entries();
        entries.retain(|_, blob| blob.expires_at > now);
        entries.insert(
            id,
            StoredBlob {
                expires_at: now + self.ttl,
                document: Arc::new(document),
            },
        );
        BlobHandle(id)
    }

    /// Returns the document behind `handle`, or `None` once it has expired.
    #[must_use]
    pub fn get(&self, handle: BlobHandle) -> Option<Arc<DecodedDocument>> {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get(&handle.0) {
            Some(blob) if blob.expires_at > now => Some(Arc::clone(&blob.document)),
            Some(_) => {
                entries.remove(&handle.0);
                None
            }
            None => None,
        }
    }

    /// Drops a handle before its TTL. Returns `true` if it was still live.
    pub fn revoke(&self, handle: BlobHandle) -> bool {
        let now = Instant::now();
        self.entries()
            .remove(&handle.0)
            .is_some_and(|blob| blob.expires_at > now)
    }

    /// Number of handles that have not yet expired.
    #[must_use]
    pub fn live_count(&self) -> usize {
        let now = Instant::now();
        self.entries()
            .values()
            .filter(|blob| blob.expires_at > now)
            .count()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, StoredBlob>> {
        // The map holds no invariants a panicking holder could break.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("ttl", &self.ttl)
            .field("live", &self.live_count())
            .finish()
    }
}

/// Decode a base64 data URL and register the bytes, returning a local handle.
///
/// # Errors
///
/// Returns [`DocumentError`] if the data URL is malformed.
pub fn convert_base64_to_blob(
    registry: &BlobRegistry,
    data_url: &str,
) -> Result<BlobHandle, DocumentError> {
    let decoded = decode_data_url(data_url)?;
    Ok(registry.insert(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn blob_round_trips_bytes_and_mime() {
        let registry = BlobRegistry::new(Duration::from_secs(60));
        let handle = convert_base64_to_blob(&registry, PNG_DATA_URL).unwrap();

        let blob = registry.get(handle).expect("handle should be live");
        let expected = decode_data_url(PNG_DATA_URL).unwrap();
        assert_eq!(blob.bytes, expected.bytes);
        assert_eq!(blob.mime_type, "image/png");
    }

    #[test]
    fn handle_formats_and_parses() {
        let registry = BlobRegistry::new(Duration::from_secs(60));
        let handle = registry.insert(DecodedDocument {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        });
        let url = handle.to_string();
        assert!(url.starts_with("blob:tindago/"));
        assert_eq!(BlobHandle::parse(&url), Some(handle));
        assert_eq!(BlobHandle::parse(&handle.id().to_string()), Some(handle));
        assert_eq!(BlobHandle::parse("blob:tindago/not-a-uuid"), None);
    }

    #[test]
    fn expired_handles_stop_resolving() {
        let registry = BlobRegistry::new(Duration::ZERO);
        let handle = registry.insert(DecodedDocument {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![9],
        });
        assert!(registry.get(handle).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn revoke_drops_live_handle() {
        let registry = BlobRegistry::new(Duration::from_secs(60));
        let handle = registry.insert(DecodedDocument {
            mime_type: "application/pdf".to_string(),
            bytes: vec![0x25, 0x50],
        });
        assert!(registry.revoke(handle));
        assert!(!registry.revoke(handle));
        assert!(registry.get(handle).is_none());
    }

    #[test]
    fn malformed_data_url_registers_nothing() {
        let registry = BlobRegistry::new(Duration::from_secs(60));
        assert!(convert_base64_to_blob(&registry, "data:image/png;base64").is_err());
        assert_eq!(registry.live_count(), 0);
    }
}

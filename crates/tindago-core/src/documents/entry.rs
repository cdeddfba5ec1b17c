//! The three historical shapes an uploaded document can be stored in.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One uploaded proof document, as found under a record's `documents` key.
///
/// Early mobile builds wrote a bare base64 data URL string, later builds an
/// object with a `uri`, and current builds an object with a hosted `url`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DocumentEntry {
    /// Key missing, `null`, or a value of no recognizable shape.
    #[default]
    Absent,
    LegacyString(String),
    LegacyObject(LegacyDocument),
    Hosted(HostedDocument),
}

/// Object form written before documents moved to the CDN.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LegacyDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Object form carrying a CDN `url`, optionally alongside a leftover `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HostedDocument {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where an uploaded document can be opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum DocumentSource {
    /// CDN URL, opened directly.
    Hosted(String),
    /// `data:` URL that must be decoded into a blob before opening.
    Inline(String),
    /// Any other non-empty value, assumed to be directly fetchable.
    Direct(String),
}

impl DocumentSource {
    fn from_legacy(raw: &str) -> Option<Self> {
        let value = non_blank(raw)?;
        if value.starts_with("data:") {
            Some(DocumentSource::Inline(value.to_string()))
        } else {
            Some(DocumentSource::Direct(value.to_string()))
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            DocumentSource::Hosted(url)
            | DocumentSource::Inline(url)
            | DocumentSource::Direct(url) => url,
        }
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, DocumentSource::Inline(_))
    }
}

impl DocumentEntry {
    /// Returns `true` only when the entry holds a non-blank `url`, `uri`, or string.
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        match self {
            DocumentEntry::Absent => false,
            DocumentEntry::LegacyString(raw) => non_blank(raw).is_some(),
            DocumentEntry::LegacyObject(doc) => doc.uri.as_deref().and_then(non_blank).is_some(),
            DocumentEntry::Hosted(doc) => {
                non_blank(&doc.url).is_some() || doc.uri.as_deref().and_then(non_blank).is_some()
            }
        }
    }

    /// Resolves the entry to an openable source, preferring a hosted `url`.
    #[must_use]
    pub fn resolve(&self) -> Option<DocumentSource> {
        match self {
            DocumentEntry::Absent => None,
            DocumentEntry::LegacyString(raw) => DocumentSource::from_legacy(raw),
            DocumentEntry::LegacyObject(doc) => {
                doc.uri.as_deref().and_then(DocumentSource::from_legacy)
            }
            DocumentEntry::Hosted(doc) => non_blank(&doc.url)
                .map(|url| DocumentSource::Hosted(url.to_string()))
                .or_else(|| doc.uri.as_deref().and_then(DocumentSource::from_legacy)),
        }
    }

    /// File name recorded at upload time, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            DocumentEntry::LegacyObject(doc) => doc.name.as_deref(),
            DocumentEntry::Hosted(doc) => doc.name.as_deref(),
            DocumentEntry::Absent | DocumentEntry::LegacyString(_) => None,
        }
    }
}

fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// ---------------------------------------------------------------------------
// Serde: read any of the stored shapes, write back the shape that was read
// ---------------------------------------------------------------------------

/// Only `url` and `uri` decide what an object is. Side fields with an
/// unexpected type stay in `extra` so the entry writes back unchanged.
fn entry_from_value(value: Value) -> DocumentEntry {
    match value {
        Value::String(text) => DocumentEntry::LegacyString(text),
        Value::Object(fields) => entry_from_object(fields),
        _ => DocumentEntry::Absent,
    }
}

fn entry_from_object(mut fields: Map<String, Value>) -> DocumentEntry {
    let url = take_string(&mut fields, "url");
    let uri = take_string(&mut fields, "uri");
    let mime_type = take_string(&mut fields, "type");
    let name = take_string(&mut fields, "name");
    let uploaded = match fields.get("uploaded") {
        Some(Value::Bool(flag)) => {
            let flag = *flag;
            fields.remove("uploaded");
            Some(flag)
        }
        _ => None,
    };

    match url {
        Some(url) => {
            if let Some(flag) = uploaded {
                fields.insert("uploaded".to_string(), Value::Bool(flag));
            }
            DocumentEntry::Hosted(HostedDocument {
                url,
                uri,
                mime_type,
                name,
                extra: fields,
            })
        }
        None => DocumentEntry::LegacyObject(LegacyDocument {
            uri,
            mime_type,
            uploaded,
            name,
            extra: fields,
        }),
    }
}

/// Removes `key` when it holds a string; any other value is left in place.
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            fields.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

impl<'de> Deserialize<'de> for DocumentEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(entry_from_value)
    }
}

impl Serialize for DocumentEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocumentEntry::Absent => serializer.serialize_none(),
            DocumentEntry::LegacyString(raw) => serializer.serialize_str(raw),
            DocumentEntry::LegacyObject(doc) => doc.serialize(serializer),
            DocumentEntry::Hosted(doc) => doc.serialize(serializer),
        }
    }
}

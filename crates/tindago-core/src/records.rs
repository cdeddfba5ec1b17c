//! Registration/store records and their normalization from stored JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::documents::{uploaded_documents, Documents, UploadedDocument};
use crate::status::StoreStatus;
use crate::CoreError;

/// A registration or store as the admin tools see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    pub status: StoreStatus,
    pub store_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub address: Option<String>,
    pub business_category: Option<String>,
    pub description: Option<String>,
    pub documents: Documents,
    pub status_reason: Option<String>,
    pub rejection_reason: Option<String>,
    /// Incremented by every status write; used to detect concurrent edits.
    pub version: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoreRecord {
    /// A fresh `pending` record with nothing but an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: StoreStatus::Pending,
            store_name: None,
            owner_name: None,
            owner_email: None,
            owner_phone: None,
            address: None,
            business_category: None,
            description: None,
            documents: Documents::new(),
            status_reason: None,
            rejection_reason: None,
            version: 1,
            created_at: None,
            updated_at: None,
        }
    }

    /// Best human-readable label: store name, then owner name, then id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.store_name
            .as_deref()
            .or(self.owner_name.as_deref())
            .unwrap_or(&self.id)
    }

    #[must_use]
    pub fn uploaded_documents(&self) -> Vec<UploadedDocument> {
        uploaded_documents(&self.documents)
    }
}

// ---------------------------------------------------------------------------
// Raw (mobile app / realtime database export) shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A record exactly as the registration app wrote it, with every field name
/// it has used over time.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStoreRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub store_address: Option<String>,
    #[serde(default)]
    pub business_category: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub store_description: Option<String>,
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub business_info: Option<BusinessInfo>,
    #[serde(default)]
    pub documents: Option<Documents>,
    #[serde(default)]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

impl RawStoreRecord {
    /// Normalize into a [`StoreRecord`], resolving legacy field names.
    ///
    /// `key` is the record's key in the export and is used when the body has
    /// no `id`. A missing status means the registration was never reviewed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStatus`] for a status outside the lifecycle.
    pub fn into_record(self, key: &str) -> Result<StoreRecord, CoreError> {
        let status = match clean(self.status) {
            Some(raw) => raw.parse::<StoreStatus>()?,
            None => StoreStatus::Pending,
        };

        let personal = self.personal_info.unwrap_or_default();
        let business = self.business_info.unwrap_or_default();

        Ok(StoreRecord {
            id: clean(self.id).unwrap_or_else(|| key.to_string()),
            status,
            store_name: first_present([self.store_name, business.store_name]),
            owner_name: first_present([self.owner_name, personal.name]),
            owner_email: first_present([self.owner_email, personal.email, self.email]),
            owner_phone: first_present([
                self.owner_phone,
                personal.mobile,
                personal.phone,
                self.phone,
            ]),
            address: first_present([self.address, self.store_address, business.address]),
            business_category: first_present([
                self.business_category,
                self.category,
                self.business_type,
                business.category,
                business.business_type,
            ]),
            description: first_present([
                self.description,
                self.store_description,
                business.description,
            ]),
            documents: self.documents.unwrap_or_default(),
            status_reason: clean(self.status_reason),
            rejection_reason: clean(self.rejection_reason),
            version: 1,
            created_at: self.created_at.as_ref().and_then(parse_timestamp),
            updated_at: self.updated_at.as_ref().and_then(parse_timestamp),
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().find_map(clean)
}

/// Timestamps arrive either as epoch milliseconds or as RFC 3339 strings.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentKind;
    use serde_json::json;

    fn raw(value: Value) -> RawStoreRecord {
        serde_json::from_value(value).expect("raw record parses")
    }

    #[test]
    fn top_level_fields_win() {
        let record = raw(json!({
            "status": "approved",
            "ownerName": "Aling Nena",
            "personalInfo": {"name": "Nena Reyes"},
            "address": "Brgy. San Roque",
            "storeAddress": "old address"
        }))
        .into_record("reg-1")
        .unwrap();

        assert_eq!(record.id, "reg-1");
        assert_eq!(record.status, StoreStatus::Approved);
        assert_eq!(record.owner_name.as_deref(), Some("Aling Nena"));
        assert_eq!(record.address.as_deref(), Some("Brgy. San Roque"));
    }

    #[test]
    fn falls_back_to_personal_and_business_info() {
        let record = raw(json!({
            "personalInfo": {"name": "Mang Tonyo", "email": "tonyo@example.ph", "mobile": "09171234567"},
            "businessInfo": {"storeName": "Tonyo's Sari-Sari", "businessType": "sari-sari", "description": "Corner store"},
            "storeAddress": "Purok 3"
        }))
        .into_record("reg-2")
        .unwrap();

        assert_eq!(record.status, StoreStatus::Pending);
        assert_eq!(record.owner_name.as_deref(), Some("Mang Tonyo"));
        assert_eq!(record.owner_email.as_deref(), Some("tonyo@example.ph"));
        assert_eq!(record.owner_phone.as_deref(), Some("09171234567"));
        assert_eq!(record.store_name.as_deref(), Some("Tonyo's Sari-Sari"));
        assert_eq!(record.business_category.as_deref(), Some("sari-sari"));
        assert_eq!(record.description.as_deref(), Some("Corner store"));
        assert_eq!(record.address.as_deref(), Some("Purok 3"));
        assert_eq!(record.display_name(), "Tonyo's Sari-Sari");
    }

    #[test]
    fn blank_strings_do_not_shadow_fallbacks() {
        let record = raw(json!({
            "ownerEmail": "  ",
            "email": "fallback@example.ph"
        }))
        .into_record("reg-3")
        .unwrap();
        assert_eq!(record.owner_email.as_deref(), Some("fallback@example.ph"));
    }

    #[test]
    fn body_id_overrides_key() {
        let record = raw(json!({"id": "store-9"})).into_record("key-9").unwrap();
        assert_eq!(record.id, "store-9");
    }

    #[test]
    fn unknown_status_is_an_error() {
        let err = raw(json!({"status": "archived"}))
            .into_record("reg-4")
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownStatus(ref s) if s == "archived"));
    }

    #[test]
    fn documents_and_timestamps_are_carried_over() {
        let record = raw(json!({
            "documents": {"validId": {"uri": "data:image/png;base64,AAA="}},
            "createdAt": 1_700_000_000_000_i64,
            "updatedAt": "2024-03-01T08:00:00Z"
        }))
        .into_record("reg-5")
        .unwrap();

        assert_eq!(
            record
                .uploaded_documents()
                .iter()
                .map(|d| d.kind)
                .collect::<Vec<_>>(),
            vec![DocumentKind::ValidId]
        );
        assert_eq!(
            record.created_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
        assert_eq!(
            record.updated_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T08:00:00+00:00".to_string())
        );
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(StoreRecord::new("reg-6").display_name(), "reg-6");
    }
}

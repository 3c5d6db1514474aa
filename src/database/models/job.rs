use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One processed document and its OCR results.
///
/// Serialized with camelCase keys, which is also the shape stored in the
/// document store's `jobs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub processed_quantity: i32,
    #[serde(default)]
    pub stamp_required: bool,
    #[serde(default)]
    pub signature_required: bool,
    #[serde(default)]
    pub stamp_detected: bool,
    #[serde(default)]
    pub signature_detected: bool,
    #[serde(default)]
    pub extracted: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of `xti_ocr_job_t`
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: String,
    pub file_id: String,
    pub file_name: Option<String>,
    pub status: Option<String>,
    pub quantity: i32,
    pub processed_quantity: i32,
    pub stamp_required: bool,
    pub signature_required: bool,
    pub stamp_detected: bool,
    pub signature_detected: bool,
    pub extracted: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            file_id: row.file_id,
            file_name: row.file_name,
            status: row.status,
            quantity: row.quantity,
            processed_quantity: row.processed_quantity,
            stamp_required: row.stamp_required,
            signature_required: row.signature_required,
            stamp_detected: row.stamp_detected,
            signature_detected: row.signature_detected,
            extracted: row.extracted.unwrap_or(Value::Null),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full-document replacement body for `PUT /api/process-data/:id`.
///
/// Every field is optional on the wire and falls back to its default; the
/// identifier comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub processed_quantity: i32,
    #[serde(default)]
    pub stamp_required: bool,
    #[serde(default)]
    pub signature_required: bool,
    #[serde(default)]
    pub stamp_detected: bool,
    #[serde(default)]
    pub signature_detected: bool,
    #[serde(default)]
    pub extracted: Value,
}

impl JobUpdate {
    /// Build the replacement record, keeping the original creation time.
    pub fn into_record(self, id: &str, created_at: DateTime<Utc>, now: DateTime<Utc>) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            file_id: self.file_id,
            file_name: self.file_name,
            status: self.status,
            quantity: self.quantity,
            processed_quantity: self.processed_quantity,
            stamp_required: self.stamp_required,
            signature_required: self.signature_required,
            stamp_detected: self.stamp_detected,
            signature_detected: self.signature_detected,
            extracted: self.extracted,
            created_at,
            updated_at: now,
        }
    }
}

/// 1-64 characters from `[A-Za-z0-9_-]`
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_record_ids() {
        assert!(is_valid_record_id("JOB-0001_a"));
        assert!(!is_valid_record_id(""));
        assert!(!is_valid_record_id("job 1"));
        assert!(!is_valid_record_id("../etc"));
        assert!(!is_valid_record_id(&"x".repeat(65)));
    }

    #[test]
    fn deserializes_sparse_document() {
        let record: JobRecord = serde_json::from_value(json!({
            "id": "J1",
            "fileId": "F1",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.file_id, "F1");
        assert_eq!(record.quantity, 0);
        assert!(record.extracted.is_null());
    }

    #[test]
    fn update_keeps_creation_time() {
        let created = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let now = "2024-06-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let update: JobUpdate = serde_json::from_value(json!({ "fileId": "F9", "stampDetected": true })).unwrap();
        let record = update.into_record("J9", created, now);
        assert_eq!(record.id, "J9");
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, now);
        assert!(record.stamp_detected);
    }
}

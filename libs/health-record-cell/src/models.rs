use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub record_type: String,
    /// Public storage locator; the bytes live in the records bucket.
    pub file_url: Option<String>,
    #[serde(default)]
    pub description: String,
    pub is_private: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A parsed create form. The owning patient is never part of it.
#[derive(Debug, Clone, Default)]
pub struct NewHealthRecord {
    pub record_type: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Keeps only characters that are safe inside a storage object key.
    pub fn storage_name(&self) -> String {
        let cleaned: String = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();

        if cleaned.trim_matches('.').is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HealthRecordError {
    #[error("{0}")]
    ValidationError(String),

    #[error("File storage failed: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for HealthRecordError {
    fn from(err: anyhow::Error) -> Self {
        HealthRecordError::DatabaseError(err.to_string())
    }
}

impl From<HealthRecordError> for AppError {
    fn from(err: HealthRecordError) -> Self {
        match err {
            HealthRecordError::ValidationError(msg) => AppError::ValidationError(msg),
            HealthRecordError::StorageError(msg) => AppError::ExternalService(msg),
            HealthRecordError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn storage_name_strips_directories_and_odd_characters() {
        assert_eq!(file("blood panel.pdf").storage_name(), "blood_panel.pdf");
        assert_eq!(file("../../etc/passwd").storage_name(), "passwd");
        assert_eq!(file("C:\\scans\\x-ray.png").storage_name(), "x-ray.png");
        assert_eq!(file("..").storage_name(), "upload");
        assert_eq!(file("").storage_name(), "upload");
    }

    #[test]
    fn record_row_without_file_decodes() {
        let row = serde_json::json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "date": "2025-02-14",
            "record_type": "lab",
            "file_url": null,
            "description": "",
            "is_private": true,
            "created_at": "2025-02-14T10:00:00Z"
        });

        let record: HealthRecord = serde_json::from_value(row).unwrap();
        assert!(record.file_url.is_none());
        assert!(record.is_private);
    }
}

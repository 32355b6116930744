use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{all_rows, first_row, SupabaseClient};

use crate::models::{HealthRecord, HealthRecordError, NewHealthRecord};

pub struct HealthRecordService {
    supabase: SupabaseClient,
    bucket: String,
}

impl HealthRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            bucket: config.health_record_bucket.clone(),
        }
    }

    /// Stores a record owned by `patient_id`. An attached file is uploaded
    /// first and only its locator is written to the row; the object is
    /// removed again when the row cannot be written.
    pub async fn create(
        &self,
        patient_id: Uuid,
        record: NewHealthRecord,
        auth_token: &str,
    ) -> Result<HealthRecord, HealthRecordError> {
        debug!("Creating {} record for patient: {}", record.record_type, patient_id);

        let (object_path, file_url) = match record.file {
            Some(file) => {
                let object_path = format!("{}/{}-{}", patient_id, Uuid::new_v4(), file.storage_name());
                let url = self.supabase
                    .upload_object(&self.bucket, &object_path, &file.content_type, file.data, auth_token)
                    .await
                    .map_err(|e| {
                        error!("Upload of {} failed: {}", object_path, e);
                        HealthRecordError::StorageError(e.to_string())
                    })?;
                (Some(object_path), Some(url))
            }
            None => (None, None),
        };

        let record_data = json!({
            "patient_id": patient_id,
            "date": record.date.unwrap_or_else(|| Utc::now().date_naive()),
            "record_type": record.record_type,
            "description": record.description,
            "file_url": file_url,
            "is_private": true
        });

        let created = match self.insert_row(record_data, auth_token).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(object_path) = object_path {
                    self.discard_object(&object_path, auth_token).await;
                }
                return Err(e);
            }
        };

        info!("Health record {} created for patient {}", created.id, patient_id);
        Ok(created)
    }

    async fn insert_row(&self, record_data: Value, auth_token: &str) -> Result<HealthRecord, HealthRecordError> {
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/health_records",
            Some(auth_token),
            Some(record_data),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        first_row(result)?
            .ok_or_else(|| HealthRecordError::DatabaseError("Failed to create health record".to_string()))
    }

    async fn discard_object(&self, object_path: &str, auth_token: &str) {
        match self.supabase.remove_object(&self.bucket, object_path, auth_token).await {
            Ok(()) => warn!("Removed {} after the record insert failed", object_path),
            Err(e) => error!("Orphaned upload {} left in {}: {}", object_path, self.bucket, e),
        }
    }

    /// Every record of the patient, private ones included.
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<HealthRecord>, HealthRecordError> {
        debug!("Fetching health records for patient: {}", patient_id);

        let path = format!(
            "/rest/v1/health_records?patient_id=eq.{}&order=date.desc,created_at.desc",
            patient_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(all_rows(result)?)
    }
}

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::policy;

use crate::models::{HealthRecordError, NewHealthRecord, UploadedFile};
use crate::services::record::HealthRecordService;

fn form_error(e: impl std::fmt::Display) -> HealthRecordError {
    HealthRecordError::ValidationError(format!("Multipart error: {}", e))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, HealthRecordError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HealthRecordError::ValidationError(format!("{} is required", field)))
}

/// Reads the create form. Unknown fields, including any attempt to name
/// the owning patient, are skipped.
pub async fn read_record_form(mut multipart: Multipart) -> Result<NewHealthRecord, HealthRecordError> {
    let mut record_type = None;
    let mut description = None;
    let mut date = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "record_type" => record_type = Some(field.text().await.map_err(form_error)?),
            "description" => description = Some(field.text().await.map_err(form_error)?),
            "date" => {
                let raw = field.text().await.map_err(form_error)?;
                if !raw.trim().is_empty() {
                    let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                        HealthRecordError::ValidationError("Invalid date format, expected YYYY-MM-DD".to_string())
                    })?;
                    date = Some(parsed);
                }
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(form_error)?;
                if !data.is_empty() {
                    file = Some(UploadedFile { filename, content_type, data: data.to_vec() });
                }
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    let record_type = required_text(record_type, "record_type")?;
    let description = required_text(description, "description")?;

    Ok(NewHealthRecord { record_type, description, date, file })
}

#[axum::debug_handler]
pub async fn create_health_record(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient_id = policy::check(&actor, Role::Patient, None)?;

    let multipart = multipart.map_err(|rejection| {
        warn!("Rejected health record upload: {}", rejection.body_text());
        AppError::ValidationError(rejection.body_text())
    })?;

    let form = read_record_form(multipart).await.inspect_err(|e| {
        warn!("Rejected health record form from patient {}: {}", patient_id, e);
    })?;

    let record = HealthRecordService::new(&state)
        .create(patient_id, form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(record))))
}

#[axum::debug_handler]
pub async fn list_health_records(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let patient_id = policy::check(&actor, Role::Patient, None)?;

    let records = HealthRecordService::new(&state)
        .list_for_patient(patient_id, auth.token())
        .await?;

    Ok(Json(json!(records)))
}

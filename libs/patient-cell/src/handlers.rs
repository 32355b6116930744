use std::sync::Arc;
use axum::{
    extract::{rejection::QueryRejection, Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use appointment_cell::AppointmentService;
use health_record_cell::api::HealthRecordService;
use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::policy;

use crate::models::{PatientError, PatientRecordsQuery};
use crate::services::PatientService;

/// Distinct patients who have booked the acting doctor at least once.
#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = policy::check(&actor, Role::Doctor, None)?;

    let patient_ids = AppointmentService::new(&config)
        .patient_ids_for_doctor(doctor_id, auth.token())
        .await?;
    let patients = PatientService::new(&config)
        .get_many(&patient_ids, auth.token())
        .await?;

    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn get_patient_records(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    query: Result<Query<PatientRecordsQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = policy::check(&actor, Role::Doctor, None)?;
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected patient records query: {}", rejection.body_text());
        PatientError::ValidationError(rejection.body_text())
    })?;

    let patient_id = query
        .patient_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| PatientError::ValidationError("patient_id is required".to_string()))?;
    let patient_id = Uuid::parse_str(patient_id)
        .map_err(|_| PatientError::ValidationError("patient_id must be a UUID".to_string()))?;

    let patient = PatientService::new(&config)
        .get_patient(patient_id, auth.token())
        .await?;
    let health_records = HealthRecordService::new(&config)
        .list_for_patient(patient.id, auth.token())
        .await?;
    let appointments = AppointmentService::new(&config)
        .list_between(doctor_id, patient.id, auth.token())
        .await?;

    Ok(Json(json!({
        "patient": patient,
        "health_records": health_records,
        "appointments": appointments
    })))
}

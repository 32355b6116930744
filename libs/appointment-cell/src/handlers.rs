// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::policy;

use crate::models::{
    AppointmentError, AppointmentStatus, BookAppointmentRequest, CreatePrescriptionRequest,
    UpdateStatusRequest,
};
use crate::services::AppointmentService;

fn invalid_body(rejection: JsonRejection) -> AppointmentError {
    warn!("Rejected appointment payload: {}", rejection.body_text());
    AppointmentError::ValidationError(rejection.body_text())
}

fn invalid_path(rejection: PathRejection) -> AppointmentError {
    warn!("Rejected appointment path: {}", rejection.body_text());
    AppointmentError::ValidationError(rejection.body_text())
}

// ==============================================================================
// BOOKING AND LISTING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient_id = policy::check(&actor, Role::Patient, None)?;
    let Json(request) = payload.map_err(invalid_body)?;

    let appointment = AppointmentService::new(&state)
        .book(patient_id, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Appointment booked successfully",
        "appointment": appointment
    }))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointments = match policy::check_any(&actor)? {
        (Role::Doctor, doctor_id) => service.list_for_doctor(doctor_id, auth.token()).await?,
        (_, patient_id) => service.list_for_patient(patient_id, auth.token()).await?,
    };

    Ok(Json(json!(appointments)))
}

// ==============================================================================
// DOCTOR OPERATIONS
// ==============================================================================

/// The role gate runs before the lookup so a patient learns nothing about
/// which ids exist. Ownership is checked before the status is parsed.
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    appointment_id: Result<Path<Uuid>, PathRejection>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    policy::check(&actor, Role::Doctor, None)?;
    let Path(appointment_id) = appointment_id.map_err(invalid_path)?;

    let service = AppointmentService::new(&state);
    let appointment = service.get(appointment_id, auth.token()).await?;
    policy::check(&actor, Role::Doctor, Some(appointment.doctor_id))?;

    let Json(request) = payload.map_err(invalid_body)?;
    let new_status: AppointmentStatus = request
        .status
        .as_deref()
        .ok_or(AppointmentError::InvalidStatus)?
        .parse()?;

    let updated = service.update_status(&appointment, new_status, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "status": updated.status
    })))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreatePrescriptionRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    policy::check(&actor, Role::Doctor, None)?;

    let Json(request) = payload.map_err(invalid_body)?;
    let appointment_id = request.appointment_id.ok_or(AppointmentError::MissingFields)?;
    let prescription = request
        .prescription
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(AppointmentError::MissingFields)?;

    let service = AppointmentService::new(&state);
    let appointment = service.get(appointment_id, auth.token()).await?;
    policy::check(&actor, Role::Doctor, Some(appointment.doctor_id))?;

    let updated = service
        .create_prescription(appointment.id, prescription, request.diagnosis.as_deref(), auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": updated
    })))
}

/// Consultation room placeholder. There is no video transport behind the
/// link; the appointment is returned as stored.
#[axum::debug_handler]
pub async fn get_meeting(
    State(state): State<Arc<AppConfig>>,
    appointment_id: Result<Path<Uuid>, PathRejection>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    policy::check(&actor, Role::Doctor, None)?;
    let Path(appointment_id) = appointment_id.map_err(invalid_path)?;

    let appointment = AppointmentService::new(&state)
        .get(appointment_id, auth.token())
        .await?;
    policy::check(&actor, Role::Doctor, Some(appointment.doctor_id))?;

    Ok(Json(json!({
        "meeting_link": appointment.meeting_link,
        "appointment": appointment
    })))
}

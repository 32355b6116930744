use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::policy;

use crate::models::{empty_schedule, DoctorError};
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    policy::check_any(&actor)?;

    let doctors = DoctorService::new(&state).list_doctors(auth.token()).await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = policy::check(&actor, Role::Doctor, None)?;

    let available_times = DoctorService::new(&state)
        .get_schedule(doctor_id, auth.token())
        .await?;

    Ok(Json(json!({
        "available_times": available_times
    })))
}

/// Body: `{"available_times": {"monday": ["09:00", ...], ...}}`. A missing
/// key clears the schedule.
#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = policy::check(&actor, Role::Doctor, None)?;
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected schedule payload: {}", rejection.body_text());
        DoctorError::InvalidSchedule(rejection.body_text())
    })?;

    let body = body
        .as_object()
        .ok_or_else(|| AppError::ValidationError("Invalid schedule format".to_string()))?;
    let requested = body.get("available_times").cloned().unwrap_or_else(empty_schedule);

    let available_times = DoctorService::new(&state)
        .update_schedule(doctor_id, &requested, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "available_times": available_times
    })))
}

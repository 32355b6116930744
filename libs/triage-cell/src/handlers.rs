use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_models::auth::Actor;
use shared_models::error::AppError;

use crate::analysis::{analyze_symptoms, SymptomsRequest};

#[axum::debug_handler]
pub async fn analyze(
    Extension(actor): Extension<Actor>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected symptoms payload: {}", rejection.body_text());
        AppError::ValidationError(rejection.body_text())
    })?;

    let report = analyze_symptoms(request.symptoms.as_deref().unwrap_or_default())?;
    debug!("Triage for user {}: {} ({} conditions)", actor.user_id, report.severity, report.possible_conditions.len());

    Ok(Json(json!(report)))
}

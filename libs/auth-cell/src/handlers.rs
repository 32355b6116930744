use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, State},
    http::{HeaderMap, StatusCode},
};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::{Actor, SessionResponse, TokenResponse};
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

use crate::models::{LoginRequest, RegisterRequest, VerifyResponse};
use crate::services::AccountService;

fn invalid_body(rejection: JsonRejection) -> AppError {
    warn!("Rejected auth payload: {}", rejection.body_text());
    AppError::ValidationError(rejection.body_text())
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let session = AccountService::new(&config).register(request).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let session = AccountService::new(&config).login(request).await?;

    Ok(Json(session))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.supabase_jwt_secret) {
        Ok(actor) => Ok(Json(TokenResponse {
            valid: true,
            user_id: actor.user_id.to_string(),
            email: actor.email,
            role: Some(actor.role.to_string()),
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}

/// Never fails on a bad token; reports it as `valid: false`.
pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, AppError> {
    debug!("Verifying token");

    let valid = extract_bearer_token(&headers)
        .ok()
        .map(|token| jwt::validate_token(&token, &config.supabase_jwt_secret).is_ok())
        .unwrap_or(false);

    Ok(Json(VerifyResponse { valid }))
}

pub async fn me(Extension(actor): Extension<Actor>) -> Json<Actor> {
    Json(actor)
}

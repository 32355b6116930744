use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::auth::Actor;
use shared_models::error::AppError;

use crate::models::MedicineSearchQuery;
use crate::services::MedicineSearchService;

/// Open to every authenticated actor, whatever their role.
#[axum::debug_handler]
pub async fn search_medicines(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_actor): Extension<Actor>,
    params: Result<Query<MedicineSearchQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params.map_err(|rejection| {
        warn!("Rejected medicine search query: {}", rejection.body_text());
        AppError::ValidationError(rejection.body_text())
    })?;

    let results = MedicineSearchService::new(&state)
        .search(params.query.as_deref().unwrap_or_default(), auth.token())
        .await?;

    Ok(Json(json!(results)))
}

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn health_record_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health-records/", get(handlers::list_health_records))
        .route("/health-records/create/", post(handlers::create_health_record))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // All appointment operations require authentication
    Router::new()
        .route(
            "/appointments/",
            post(handlers::book_appointment).get(handlers::list_appointments),
        )
        .route("/appointments/{appointment_id}/status/", post(handlers::update_status))
        .route("/appointments/{appointment_id}/meeting/", get(handlers::get_meeting))
        .route("/prescriptions/create/", post(handlers::create_prescription))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
